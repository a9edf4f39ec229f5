use datashare_types::{Error, ResourceUri};

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_with_authority() {
    let uri = ResourceUri::parse("datashare://com.example.provider/entry/DB00/TBL00").unwrap();
    assert_eq!(uri.scheme(), "datashare");
    assert_eq!(uri.authority(), "com.example.provider");
    assert_eq!(uri.path(), "/entry/DB00/TBL00");
    assert_eq!(uri.last_segment(), Some("TBL00"));
}

#[test]
fn parse_empty_authority_uses_first_segment() {
    let uri = ResourceUri::parse("datashare:///com.example.provider/entry/TBL00").unwrap();
    assert_eq!(uri.authority(), "com.example.provider");
    assert_eq!(uri.segments().len(), 3);
}

#[test]
fn parse_empty_string_fails() {
    assert!(matches!(
        ResourceUri::parse(""),
        Err(Error::InvalidUri(_))
    ));
}

#[test]
fn parse_missing_scheme_fails() {
    assert!(ResourceUri::parse("com.example/entry").is_err());
}

#[test]
fn parse_scheme_only_fails() {
    assert!(ResourceUri::parse("datashare://").is_err());
}

#[test]
fn parse_collapses_duplicate_slashes() {
    let uri = ResourceUri::parse("datashare://com.example//entry///TBL00").unwrap();
    assert_eq!(uri.path(), "/entry/TBL00");
}

#[test]
fn parse_from_str_trait() {
    let uri: ResourceUri = "datashare://com.example/t".parse().unwrap();
    assert_eq!(uri.authority(), "com.example");
}

// ── Query parameters ─────────────────────────────────────────────

#[test]
fn query_pairs_in_order() {
    let uri = ResourceUri::parse("datashare://com.example/t?a=1&b=2").unwrap();
    let pairs = uri.query_pairs();
    assert_eq!(pairs[0], ("a".to_string(), "1".to_string()));
    assert_eq!(pairs[1], ("b".to_string(), "2".to_string()));
}

#[test]
fn query_param_case_insensitive_key() {
    let uri = ResourceUri::parse("datashare://com.example/t?Proxy=true").unwrap();
    assert_eq!(uri.query_param("proxy"), Some("true"));
}

#[test]
fn query_param_missing() {
    let uri = ResourceUri::parse("datashare://com.example/t").unwrap();
    assert_eq!(uri.query_param("proxy"), None);
}

// ── Proxy detection ──────────────────────────────────────────────

#[test]
fn proxy_via_scheme() {
    let uri = ResourceUri::parse("datashareproxy://com.example/t").unwrap();
    assert!(uri.is_proxy());
}

#[test]
fn proxy_via_query_param() {
    let uri = ResourceUri::parse("datashare://com.example/t?Proxy=true").unwrap();
    assert!(uri.is_proxy());
}

#[test]
fn proxy_param_false_is_not_proxy() {
    let uri = ResourceUri::parse("datashare://com.example/t?Proxy=false").unwrap();
    assert!(!uri.is_proxy());
}

#[test]
fn plain_uri_is_not_proxy() {
    let uri = ResourceUri::parse("datashare://com.example/t").unwrap();
    assert!(!uri.is_proxy());
}

// ── Normalization ────────────────────────────────────────────────

#[test]
fn normalized_strips_query() {
    let uri = ResourceUri::parse("datashare://com.example/entry/TBL00?Proxy=true").unwrap();
    assert_eq!(uri.normalized(), "datashare://com.example/entry/TBL00");
}

#[test]
fn normalized_lowercases_scheme_and_authority() {
    let uri = ResourceUri::parse("DataShare://Com.Example/Entry/TBL00").unwrap();
    assert_eq!(uri.normalized(), "datashare://com.example/Entry/TBL00");
}

#[test]
fn normalized_is_idempotent() {
    let inputs = [
        "datashare://com.example/entry/DB00/TBL00?Proxy=true&user=100",
        "datashare:///com.example/entry/TBL00",
        "DATASHAREPROXY://Com.Example/t",
        "datashare://com.example//a///b",
    ];
    for input in inputs {
        let once = ResourceUri::parse(input).unwrap().normalized();
        let twice = ResourceUri::parse(&once).unwrap().normalized();
        assert_eq!(once, twice, "not idempotent for {input}");
    }
}

#[test]
fn normalized_preserves_empty_authority_form() {
    let uri = ResourceUri::parse("datashare:///com.example/entry").unwrap();
    let normalized = uri.normalized();
    assert_eq!(normalized, "datashare:///com.example/entry");
    let reparsed = ResourceUri::parse(&normalized).unwrap();
    assert_eq!(reparsed.authority(), "com.example");
}

#[test]
fn display_preserves_original() {
    let raw = "datashare://Com.Example/t?Proxy=true";
    let uri = ResourceUri::parse(raw).unwrap();
    assert_eq!(uri.to_string(), raw);
}

#[test]
fn serde_roundtrip() {
    let uri = ResourceUri::parse("datashare://com.example/t?a=1").unwrap();
    let json = serde_json::to_string(&uri).unwrap();
    let parsed: ResourceUri = serde_json::from_str(&json).unwrap();
    assert_eq!(uri, parsed);
}
