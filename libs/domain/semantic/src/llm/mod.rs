// [libs/domain/semantic/src/llm/mod.rs]
//! =================================================================
//! APARATO: LLM PROVIDER ADAPTERS (V2.0)
//! RESPONSABILIDAD: IMPLEMENTACIONES CONCRETAS DEL EJECUTOR
//! =================================================================

mod azure;

pub use azure::AzureStructuredExecutor;
