use camino::Utf8Path;
use camino::Utf8PathBuf;
use ignore::WalkBuilder;

/// Walk the given paths and collect files that pass `predicate`.
///
/// Each entry may be a file or a directory. Files are included directly
/// when they match; directories are walked recursively with hidden entries
/// skipped and gitignore rules respected (via the `ignore` crate).
///
/// Returns a sorted, deduplicated list.
#[must_use]
pub fn walk_files(
    paths: &[Utf8PathBuf],
    predicate: impl Fn(&Utf8Path) -> bool,
) -> Vec<Utf8PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if predicate(path) {
                files.push(path.clone());
            }
            continue;
        }

        if !path.is_dir() {
            continue;
        }

        let walker = WalkBuilder::new(path.as_std_path()).build();
        for entry in walker.filter_map(Result::ok) {
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let Some(utf8) = Utf8Path::from_path(entry.path()) else {
                continue;
            };
            if predicate(utf8) {
                files.push(utf8.to_owned());
            }
        }
    }

    files.sort();
    files.dedup();
    files
}
