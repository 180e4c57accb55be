use warden::middleware::pipeline::compile_routes;
use warden_config::RouteConfig;
use warden_core::RouteClass;

#[test]
fn test_default_routes_compile() {
    let table = compile_routes(&RouteConfig::default()).unwrap();
    assert!(!table.bypass.is_empty());
    assert!(!table.redirect.is_empty());
}

#[test]
fn test_default_classification() {
    let table = compile_routes(&RouteConfig::default()).unwrap();

    assert_eq!(table.classify("/feed.xml").classes(), vec![RouteClass::Bypass]);
    assert_eq!(table.classify("/static/app.css").classes(), vec![RouteClass::Bypass]);
    assert_eq!(table.classify("/admin/settings").classes(), vec![RouteClass::Admin]);
    assert_eq!(table.classify("/api/me").classes(), vec![RouteClass::Protected]);
    assert_eq!(
        table.classify("/dashboard/").classes(),
        vec![RouteClass::ProtectedRedirect]
    );
    assert_eq!(
        table.classify("/login").classes(),
        vec![RouteClass::RedirectIfAuthenticated]
    );
    assert!(table.classify("/").classes().is_empty());
}

#[test]
fn test_routes_from_environment_lists() {
    let config = RouteConfig::from_vars(|key| match key {
        "ROUTES_ADMIN" => Some("/ops/*, /admin/*".to_string()),
        "ROUTES_BYPASS" => Some(String::new()),
        _ => None,
    });
    let table = compile_routes(&config).unwrap();

    assert!(table.admin.matches("/ops/queues"));
    assert!(table.bypass.is_empty());
    assert!(!table.is_bypass("/health"));
}
