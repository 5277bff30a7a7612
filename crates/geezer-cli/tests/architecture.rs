use arch_lint::rules::{NoErrorSwallowing, NoSilentResultDrop};
use arch_lint::{Analyzer, Severity};
use std::path::Path;

fn workspace_root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("workspace root")
}

/// Library and binary code must not swallow errors (AL003) or drop
/// `Result`s silently (AL013). Test code is exempt.
#[test]
fn no_swallowed_errors_outside_tests() {
    let analyzer = Analyzer::builder()
        .root(workspace_root())
        .exclude("**/target/**")
        .exclude("**/tests/**")
        .exclude("**/.geezer-bundle/**")
        .exclude("examples/**")
        .rule(NoErrorSwallowing::new())
        .rule(NoSilentResultDrop::new())
        .build()
        .expect("build analyzer");

    let result = analyzer.analyze().expect("analyze");

    if result.has_violations_at(Severity::Warning) {
        panic!("{}", result.format_test_report(Severity::Warning));
    }
}
