/// Segments before the workflow path in `/git/{commit}/{path}`: the empty
/// segment before the leading slash, `git`, and the commit.
pub const PERMALINK_PATH_START: usize = 3;

/// Join the `/`-separated segments of `path` from index `start` on.
pub fn extract_path(path: &str, start: usize) -> String {
    path.split('/').skip(start).collect::<Vec<_>>().join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_route_prefix_and_commit() {
        assert_eq!(
            extract_path("/git/abc123/workflows/lobSTR/lobSTR-workflow.cwl", PERMALINK_PATH_START),
            "workflows/lobSTR/lobSTR-workflow.cwl"
        );
    }

    #[test]
    fn single_file_at_repo_root() {
        assert_eq!(extract_path("/git/abc123/wf.cwl", PERMALINK_PATH_START), "wf.cwl");
    }

    #[test]
    fn too_short_path_is_empty() {
        assert_eq!(extract_path("/git/abc123", PERMALINK_PATH_START), "");
    }
}
