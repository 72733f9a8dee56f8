mod common;

use common::TestEnv;

#[test]
fn test_create_scaffolds_first_deployment() {
    let env = TestEnv::new();

    let result = env.run(&["create", "Add Users"]);
    assert!(result.success, "create failed: {}", result.combined_output());
    assert!(result.stdout.contains("Created deployment"));

    let dir = env.deployments_root().join("000001_add_users");
    assert!(dir.is_dir(), "expected {} to exist", dir.display());

    for file in [
        "expand.sql",
        "migrate.sql",
        "contract.sql",
        "expand.sh",
        "migrate.sh",
        "contract.sh",
        "post.sh",
    ] {
        assert!(dir.join(file).is_file(), "missing {file}");
    }
}

#[test]
fn test_create_allocates_sequential_ids() {
    let env = TestEnv::new();

    for name in ["one", "two", "three"] {
        let result = env.run(&["create", name]);
        assert!(result.success, "create {name} failed");
    }

    let root = env.deployments_root();
    assert!(root.join("000001_one").is_dir());
    assert!(root.join("000002_two").is_dir());
    assert!(root.join("000003_three").is_dir());
}

#[test]
fn test_create_respects_deployments_path_flag() {
    let env = TestEnv::new();

    let result = env.run(&["create", "init", "-p", "db/changes"]);
    assert!(result.success, "create failed: {}", result.combined_output());
    assert!(env.path("db/changes/000001_init").is_dir());
}

#[test]
fn test_create_respects_deployments_path_env() {
    let env = TestEnv::new();

    let result = env.run_with_env(&["create", "init"], &[("ZDD_DEPLOYMENTS_PATH", "elsewhere")]);
    assert!(result.success, "create failed: {}", result.combined_output());
    assert!(env.path("elsewhere/000001_init").is_dir());
}

#[test]
fn test_create_json_output() {
    let env = TestEnv::new();

    let result = env.run(&["create", "Json Mode", "--json"]);
    assert!(result.success);

    let value: serde_json::Value = serde_json::from_str(&result.stdout).expect("valid JSON");
    assert_eq!(value["id"], "000001");
    assert_eq!(value["name"], "json_mode");
}
