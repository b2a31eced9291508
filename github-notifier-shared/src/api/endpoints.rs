fn base_join(base: &str, path: &str) -> String {
    let b = base.trim_end_matches('/');
    let p = path.trim_start_matches('/');
    format!("{}/{}", b, p)
}

pub fn notifications(base: &str) -> String {
    base_join(base, "/notifications")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_without_doubled_slashes() {
        assert_eq!(
            notifications("https://api.github.com/"),
            "https://api.github.com/notifications"
        );
        assert_eq!(
            notifications("http://127.0.0.1:8080/api/v3"),
            "http://127.0.0.1:8080/api/v3/notifications"
        );
    }
}
