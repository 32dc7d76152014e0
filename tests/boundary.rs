use std::fs;
use std::path::{Path, PathBuf};

fn collect_rs_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return files,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            files.extend(collect_rs_files(&path));
        } else if path.extension().is_some_and(|e| e == "rs") {
            files.push(path);
        }
    }
    files
}

fn offenders_matching(root: &Path, needles: &[&str]) -> Vec<String> {
    collect_rs_files(root)
        .into_iter()
        .filter(|path| {
            let contents = fs::read_to_string(path).unwrap_or_default();
            needles.iter().any(|needle| contents.contains(needle))
        })
        .map(|path| path.to_string_lossy().to_string())
        .collect()
}

#[test]
fn handlers_do_not_run_sql_directly() {
    let handlers_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("src")
        .join("handlers");
    let offenders = offenders_matching(&handlers_root, &["sqlx::query"]);

    if !offenders.is_empty() {
        panic!(
            "Handlers must go through the service layer, not raw SQL. Offenders: {:?}",
            offenders
        );
    }
}

#[test]
fn counter_updates_recompute_instead_of_incrementing() {
    // Delta updates on cached counters reintroduce lost-update races;
    // every counter write must recount from source rows.
    let db_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src").join("db");
    let offenders = offenders_matching(
        &db_root,
        &[
            "likes + 1",
            "likes - 1",
            "comments_count + 1",
            "sub_comments_count + 1",
        ],
    );

    if !offenders.is_empty() {
        panic!(
            "Counter columns must be recomputed from rows, never incremented. Offenders: {:?}",
            offenders
        );
    }
}
