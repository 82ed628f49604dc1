use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    embed_levels();
}

/// Every `*.json` under `root`, named by its path relative to `root` without the extension.
fn find_level_files(root: &Path) -> Vec<(String, PathBuf)> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        println!("cargo:rerun-if-changed={}", dir.display());
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for path in entries.flatten().map(|e| e.path()) {
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            if path.extension().is_none_or(|e| e != "json") {
                continue;
            }
            let Ok(relative) = path.with_extension("").strip_prefix(root).map(Path::to_path_buf)
            else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            println!("cargo:rerun-if-changed={}", path.display());
            found.push((name, path));
        }
    }
    found.sort();
    found
}

fn embed_levels() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("levels.rs");
    let levels_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../levels");

    let mut code = String::from("pub(crate) static LEVEL_DATA: &[(&str, &str)] = &[\n");
    for (name, path) in find_level_files(&levels_dir) {
        let absolute = path.canonicalize().unwrap_or(path);
        writeln!(code, "    ({name:?}, include_str!({:?})),", absolute.display().to_string())
            .expect("writing to a String cannot fail");
    }
    code.push_str("];\n");

    // Rewriting an unchanged file would force the crate to rebuild.
    if fs::read_to_string(&dest_path).ok().as_deref() != Some(code.as_str()) {
        fs::write(&dest_path, code).expect("failed to write embedded level table");
    }
}
