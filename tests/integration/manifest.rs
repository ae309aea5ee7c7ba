use lazymod::ContainerError;
use lazymod::manifest::Manifest;
use lazymod::test_utils::TestManifest;

#[tokio::test]
async fn test_load_diamond_manifest() {
    let file = TestManifest::diamond().unwrap();
    let manifest = Manifest::load(file.path()).unwrap();
    let container = manifest.into_container().unwrap();

    assert_eq!(container.names(), vec!["a", "b", "c"]);
    assert_eq!(*container.resolve_as::<String>("c").await.unwrap(), "aabc");
}

#[tokio::test]
async fn test_explicit_dependencies_override_placeholders() {
    let manifest = Manifest::from_toml_str(
        r#"
        [modules.o1]
        value = "o1"

        [modules.o2]
        dependencies = ["o1"]
        template = "{0} augmented"
        "#,
    )
    .unwrap();

    let container = manifest.into_container().unwrap();
    assert_eq!(*container.resolve_as::<String>("o2").await.unwrap(), "o1 augmented");
}

#[tokio::test]
async fn test_manifest_missing_dependency() {
    let manifest = Manifest::from_toml_str(
        r#"
        [modules.willFail]
        template = "{notHere}"
        "#,
    )
    .unwrap();

    let container = manifest.into_container().unwrap();
    let err = container.resolve("willFail").await.unwrap_err();
    assert!(err.to_string().to_lowercase().contains("dependency not found"));
}

#[tokio::test]
async fn test_manifest_cycle() {
    let manifest = Manifest::from_toml_str(
        r#"
        [modules.a]
        template = "{c}"

        [modules.b]
        template = "{a}"

        [modules.c]
        template = "{b}"
        "#,
    )
    .unwrap();

    let container = manifest.into_container().unwrap();
    assert!(matches!(
        container.validate_graph(),
        Err(ContainerError::CircularDependency { .. })
    ));
    for name in ["a", "b", "c"] {
        assert!(matches!(
            container.resolve(name).await,
            Err(ContainerError::CircularDependency { .. })
        ));
    }
}

#[test]
fn test_invalid_module_name_in_manifest() {
    let manifest = Manifest::from_toml_str(
        r#"
        [modules."9lives"]
        value = "x"
        "#,
    )
    .unwrap();

    let err = manifest.into_container().unwrap_err();
    assert!(err.to_string().contains("Failed to register module '9lives' from manifest"));
    assert!(matches!(
        err.downcast_ref::<ContainerError>(),
        Some(ContainerError::InvalidName { .. })
    ));
}

#[test]
fn test_manifest_rejects_value_with_dependencies() {
    let err = Manifest::from_toml_str(
        r#"
        [modules.a]
        value = "a"
        dependencies = ["b"]
        "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("cannot declare `dependencies`"));
}

#[test]
fn test_register_into_existing_container() {
    let container = lazymod::Container::new();
    container.register_and_export("a", "a".to_string()).unwrap();

    let manifest = Manifest::from_toml_str("[modules.a]\nvalue = \"again\"\n").unwrap();
    let err = manifest.register_into(&container).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ContainerError>(),
        Some(ContainerError::DuplicateRegistration { .. })
    ));
}

#[test]
fn test_load_missing_file() {
    let file = TestManifest::diamond().unwrap();
    let err = Manifest::load(&file.dir().join("nope.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
