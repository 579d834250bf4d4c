use std::{
    path::{Path, PathBuf},
    process::exit,
};

pub fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|e| {
        eprintln!("Failed to get current dir: {}", e);
        exit(1);
    })
}

pub fn replace_homedir_to_tilde(path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    let Some(home_dir) = ::dirs::home_dir() else {
        return path
    };
    path.strip_prefix(home_dir)
        .map(|path| Path::new("~").join(path))
        .unwrap_or(path)
}

/// `foo/bar_1.in` => `bar_1`
pub fn file_stem_lossy(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn file_stem() {
        assert_eq!(file_stem_lossy(Path::new("dir/foo_1.in")), "foo_1");
        assert_eq!(file_stem_lossy(Path::new("foo")), "foo");
    }

    #[test]
    fn tilde() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        if home == Path::new("/") {
            return;
        }
        assert_eq!(
            replace_homedir_to_tilde(home.join("a/b.toml")),
            Path::new("~/a/b.toml")
        );
        assert_eq!(replace_homedir_to_tilde("/tmp/x"), Path::new("/tmp/x"));
    }
}
