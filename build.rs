use time::format_description;
use time::OffsetDateTime;

/// Emit `name` as a compile-time env var: the environment's value if set,
/// else the build time formatted with `pattern`.
fn stamp(name: &str, pattern: &str, now: OffsetDateTime) {
    println!("cargo:rerun-if-env-changed={name}");
    let value = std::env::var(name).unwrap_or_else(|_| {
        format_description::parse(pattern)
            .ok()
            .and_then(|fmt| now.format(&fmt).ok())
            .unwrap_or_else(|| "unknown".to_string())
    });
    println!("cargo:rustc-env={name}={value}");
}

fn main() {
    let now = OffsetDateTime::now_utc();
    stamp("MESHBUF_BUILD_DATE", "[year]-[month]-[day]", now);
    stamp("MESHBUF_BUILD_TIME", "[hour]:[minute]:[second] UTC", now);
}
