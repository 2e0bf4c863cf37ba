/// The version reported by `--version` and logged at startup: the tag
/// stamped by build.rs when there is one, otherwise the crate version.
pub fn pruner_version() -> &'static str {
    pick_version(
        option_env!("SPHERE_PRUNER_CI_TAG"),
        env!("CARGO_PKG_VERSION"),
    )
}

fn pick_version(tag: Option<&'static str>, package: &'static str) -> &'static str {
    match tag.map(str::trim) {
        Some(tag) if !tag.is_empty() => tag,
        _ => package,
    }
}
