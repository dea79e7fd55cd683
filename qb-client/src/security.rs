use std::sync::LazyLock;

use regex::Regex;

static USER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9a-z]+_[0-9a-z]+)_([0-9a-z]{4})[0-9a-z]+([0-9a-z]{4})")
        .expect("user token pattern is valid")
});

/// Mask every user token in `s`, keeping the first and last four characters
/// of the secret so tokens can still be told apart.
pub fn mask_tokens(s: &str) -> String {
    USER_TOKEN
        .replace_all(s, "${1}_${2}********************${3}")
        .into_owned()
}

/// Mask a temporary token entirely except its last four characters.
pub fn mask_secret(s: &str) -> String {
    let len = s.chars().count();
    if len <= 4 {
        return "****".to_string();
    }
    let tail: String = s.chars().skip(len - 4).collect();
    format!("********{tail}")
}
