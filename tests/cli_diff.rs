//! `kovl diff` compares two resolved roots.

mod common;

use common::{
    TestEnv, BASE_KUSTOMIZATION, NGINX_DEPLOYMENT, NGINX_SERVICE, PROD_OVERLAY_KUSTOMIZATION,
    REPLICA_PATCH,
};

fn seed(env: &TestEnv) {
    env.write("base/deployment.yaml", NGINX_DEPLOYMENT);
    env.write("base/service.yaml", NGINX_SERVICE);
    env.write("base/kustomization.yaml", BASE_KUSTOMIZATION);
    env.write(
        "overlays/prod/kustomization.yaml",
        PROD_OVERLAY_KUSTOMIZATION,
    );
    env.write("overlays/prod/replica-patch.yaml", REPLICA_PATCH);
}

#[test]
fn test_diff_identical_roots_exits_zero() {
    let env = TestEnv::new();
    seed(&env);

    let result = env.run(&["diff", "base", "base"]);
    assert!(result.success, "no differences must exit 0");
    assert!(result.combined_output().contains("no differences"));
}

#[test]
fn test_diff_base_vs_overlay_exits_one() {
    let env = TestEnv::new();
    seed(&env);

    let result = env.run(&["diff", "base", "overlays/prod"]);
    assert_eq!(result.exit_code, 1, "differences must exit 1");
    assert!(result.stdout.contains("-  replicas: 2"));
    assert!(result.stdout.contains("+  replicas: 3"));
}

#[test]
fn test_diff_json_summary() {
    let env = TestEnv::new();
    seed(&env);

    let result = env.run(&["diff", "base", "overlays/prod", "--json"]);
    assert_eq!(result.exit_code, 1);
    assert!(result.stdout.contains("\"has_changes\":true"));
    assert!(result.stdout.contains("\"additions\":1"));
    assert!(result.stdout.contains("\"deletions\":1"));
}

#[test]
fn test_diff_missing_side_fails() {
    let env = TestEnv::new();
    seed(&env);

    let result = env.run(&["diff", "base", "overlays/nope"]);
    assert_eq!(result.exit_code, 2, "resolution errors are not diff results");
    assert!(result.stderr.contains("not found"));
}
