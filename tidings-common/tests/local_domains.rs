#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use tidings_common::{ConfigError, DomainRegistry, Jid, LocalDomains};

#[test]
fn loads_domains_from_ron_and_checks_recipients() {
    let domains = LocalDomains::from_ron_str(
        r#"(
            server: "Shakespeare.lit",
            channels: "channels.shakespeare.lit",
            aliases: ["legacy.shakespeare.lit"],
        )"#,
    )
    .unwrap();

    let registry = DomainRegistry::from(domains);

    for address in [
        "juliet@shakespeare.lit",
        "romeo@SHAKESPEARE.LIT/balcony",
        "bot@channels.shakespeare.lit",
        "nurse@legacy.shakespeare.lit",
    ] {
        let jid: Jid = address.parse().unwrap();
        assert!(registry.is_local_domain(jid.domain()), "{address} should be local");
    }

    let remote: Jid = "hamlet@denmark.lit".parse().unwrap();
    assert!(!registry.is_local_domain(remote.domain()));
}

#[test]
fn rejected_reconfiguration_keeps_previous_domains() {
    let registry = DomainRegistry::new(LocalDomains::new("shakespeare.lit"));
    let observer = registry.clone();

    let result = registry.replace(LocalDomains::new("admin@denmark.lit"));
    assert!(matches!(result, Err(ConfigError::InvalidDomain { field: "server", .. })));
    assert_eq!(observer.snapshot(), LocalDomains::new("shakespeare.lit"));

    registry.replace(LocalDomains::new("denmark.lit")).unwrap();
    assert!(observer.is_local_domain("denmark.lit"));
    assert!(!observer.is_local_domain("shakespeare.lit"));
}

#[test]
fn malformed_ron_is_a_parse_error() {
    assert!(matches!(
        LocalDomains::from_ron_str("(server: )"),
        Err(ConfigError::Parse(_))
    ));
}
