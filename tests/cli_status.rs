mod common;

use common::TestEnv;

#[test]
fn test_status_with_empty_root_is_up_to_date() {
    let env = TestEnv::new();

    let result = env.run(&["status"]);
    assert!(result.success, "status failed: {}", result.combined_output());
    assert!(result.stdout.contains("Deployment Status:"));
    assert!(result.stdout.contains("All deployments are up to date!"));
}

#[test]
fn test_status_without_database_reports_pending() {
    let env = TestEnv::new();
    env.run(&["create", "add users"]);

    let result = env.run(&["status"]);
    assert!(result.success);
    assert!(result.stdout.contains("Pending (1):"));
    assert!(result.stdout.contains("○ 000001 - add_users"));
    // Scaffolded SQL is comment-only, so no phase flags appear.
    assert!(!result.stdout.contains("[expand"));
}

#[test]
fn test_status_shows_phase_flags_for_real_sql() {
    let env = TestEnv::new();
    env.run(&["create", "add users"]);

    std::fs::write(
        env.deployments_root()
            .join("000001_add_users")
            .join("migrate.sql"),
        "CREATE TABLE users (id SERIAL PRIMARY KEY);\n",
    )
    .unwrap();

    let result = env.run(&["status"]);
    assert!(result.success);
    assert!(result.stdout.contains("○ 000001 - add_users [migrate]"));
}

#[test]
fn test_status_json_output() {
    let env = TestEnv::new();
    env.run(&["create", "first"]);
    env.run(&["create", "second"]);

    let result = env.run(&["status", "--json"]);
    assert!(result.success, "status failed: {}", result.combined_output());

    let value: serde_json::Value = serde_json::from_str(&result.stdout).expect("valid JSON");
    let pending = value["pending"].as_array().unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0]["id"], "000001");
    assert_eq!(pending[1]["id"], "000002");
    assert!(value["applied"].as_array().unwrap().is_empty());
    assert!(value["missing"].as_array().unwrap().is_empty());
}

#[test]
fn test_status_skips_unrelated_directories() {
    let env = TestEnv::new();
    env.run(&["create", "real"]);
    std::fs::create_dir_all(env.deployments_root().join("notes")).unwrap();

    let result = env.run(&["status"]);
    assert!(result.success);
    assert!(result.stdout.contains("Pending (1):"));
    assert!(!result.stdout.contains("notes"));
}
