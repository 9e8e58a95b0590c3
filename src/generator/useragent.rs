use rand::Rng;

const OPERATING_SYSTEMS: [&str; 3] = [
    "Macintosh; Intel Mac OS X 10_15",
    "X11; Linux x86_64",
    "Windows NT 10.0; Win64; x64",
];

/// Synthesizes `n` plausible desktop Chrome User-Agent strings.
///
/// Major versions fall in 50..=79, builds in 1000..=4999 and patches in 0..=99.
pub fn random_user_agents<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<String> {
    (0..n)
        .map(|_| {
            let os = OPERATING_SYSTEMS[rng.gen_range(0..OPERATING_SYSTEMS.len())];
            let major = rng.gen_range(50..80);
            let build = rng.gen_range(1000..5000);
            let patch = rng.gen_range(0..100);
            format!(
                "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.{}.{} Safari/537.36",
                os, major, build, patch
            )
        })
        .collect()
}
