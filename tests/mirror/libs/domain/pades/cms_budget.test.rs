/**
 * =================================================================
 * APARATO: CMS BUDGET TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar los atributos firmados deterministas y el
 *           contrato del presupuesto dry-run.
 * =================================================================
 */

use sigilo_domain_pades::{dry_run_cms_budget, CmsSignedAttributes, SealError};

#[test]
fn certify_signature_base_is_a_der_set() {
    let digest = [0x5Au8; 32];
    let attributes = CmsSignedAttributes::for_document_digest(&digest).unwrap();
    let base = attributes.signature_base().unwrap();

    // La base de firma es el SET OF explícito (tag 0x31), exacto
    // contrato de RFC 5652 para atributos firmados.
    assert_eq!(base[0], 0x31, "La base de firma debe abrir con SET OF.");

    // El message-digest viaja íntegro dentro de la base.
    assert!(
        base.windows(digest.len()).any(|window| window == digest),
        "El digest del documento debe estar incrustado en los atributos."
    );
}

#[test]
fn certify_distinct_digests_produce_distinct_bases() {
    let base_a = CmsSignedAttributes::for_document_digest(&[0x01u8; 32])
        .unwrap()
        .signature_base()
        .unwrap();
    let base_b = CmsSignedAttributes::for_document_digest(&[0x02u8; 32])
        .unwrap()
        .signature_base()
        .unwrap();

    assert_ne!(base_a, base_b);
}

#[test]
fn certify_dry_run_demands_certificate_material() {
    let outcome = dry_run_cms_budget(&[], &[0u8; 32]);
    assert!(matches!(outcome, Err(SealError::ChainEmpty)));
}

#[test]
fn certify_dry_run_rejects_non_certificate_chain() {
    // Material que no parsea como X.509: el presupuesto no puede
    // estimar el módulo y debe fallar tipado, jamás aproximar.
    let bogus_chain = vec![vec![0x30, 0x03, 0x02, 0x01, 0x01]];
    let outcome = dry_run_cms_budget(&bogus_chain, &[0u8; 32]);
    assert!(matches!(outcome, Err(SealError::CmsEncoding(_))));
}
