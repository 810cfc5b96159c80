/**
 * =================================================================
 * APARATO: VIGÍA INTEGRITY TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la ignición única del observador, el forense
 *           de pánicos y la identidad de correlación de los spans.
 * =================================================================
 */

#[test]
fn certify_single_ignition_installs_subscriber_and_panic_forensics() {
    // La ignición debe ocurrir UNA vez por proceso, sin pánico.
    sigilo_shared_vigia::init_tracing("sigilo_vigia_certification");

    // El forense de pánicos captura colapsos de tareas secundarias
    // sin derribar el harness.
    let worker = std::thread::Builder::new()
        .name("collapsing-task".to_string())
        .spawn(|| {
            panic!("controlled collapse for certification");
        })
        .unwrap();

    assert!(worker.join().is_err(), "El pánico debe propagar al join.");
}

#[test]
fn certify_span_capabilities_carry_pipeline_identity() {
    // Los spans de dominio existen como capacidades nominadas: una
    // corrida de auditoría y una operación de sellado portan nombres
    // distintos para el colector.
    let audit = sigilo_shared_vigia::audit_span("audit-0001");
    let seal = sigilo_shared_vigia::seal_span("trace-0001");

    if let (Some(audit_meta), Some(seal_meta)) = (audit.metadata(), seal.metadata()) {
        assert_eq!(audit_meta.name(), "audit");
        assert_eq!(seal_meta.name(), "seal");
        assert!(audit_meta.fields().field("audit_id").is_some());
        assert!(seal_meta.fields().field("trace").is_some());
    }

    // Entrar y salir del span jamás falla, con o sin suscriptor.
    audit.in_scope(|| {});
    seal.in_scope(|| {});
}
