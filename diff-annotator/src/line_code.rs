//! GitLab line codes.
//!
//! GitLab addresses a diff line with `sha1("{new_path}_{new_line}")` in hex.
//! The digest must match GitLab's own computation bit for bit or the comment
//! renders on the wrong line.

use sha1::{Digest, Sha1};

/// Computes the line code for `new_line` of `new_path`.
pub fn compute_line_code(new_path: &str, new_line: u64) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("{new_path}_{new_line}").as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_digests() {
        assert_eq!(
            compute_line_code("foo.py", 10),
            "dda9d95b25576a544fdab167e9074feaf08fdd71"
        );
        assert_eq!(
            compute_line_code("foo.py", 11),
            "7ad0fcac46b64b91eb7b1ffaddb6f48b679b1d99"
        );
        assert_eq!(
            compute_line_code("src/main.rs", 1),
            "6976f5f4efe60988fe147acb0a4535708b54b84a"
        );
    }

    #[test]
    fn deterministic_and_sensitive_to_inputs() {
        let a = compute_line_code("foo.py", 10);
        assert_eq!(a, compute_line_code("foo.py", 10));
        assert_eq!(a.len(), 40);
        assert_ne!(a, compute_line_code("foo.py", 100));
        assert_ne!(a, compute_line_code("bar.py", 10));
    }
}
