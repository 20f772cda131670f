#![cfg(unix)]

use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

use rusqlite::{Connection, params};

/// Create `<parent>/<name>.docset` with a Dash index and optional documents.
fn make_docset(
    parent: &Path,
    name: &str,
    rows: &[(&str, &str, &str)],
    documents: &[&str],
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let root = parent.join(format!("{name}.docset"));
    let resources = root.join("Contents/Resources");
    std::fs::create_dir_all(resources.join("Documents"))?;

    let conn = Connection::open(resources.join("docSet.dsidx"))?;
    conn.execute_batch(
        "CREATE TABLE searchIndex(id INTEGER PRIMARY KEY, name TEXT, type TEXT, path TEXT);",
    )?;
    for (entry, kind, path) in rows {
        conn.execute(
            "INSERT INTO searchIndex (name, type, path) VALUES (?1, ?2, ?3)",
            params![entry, kind, path],
        )?;
    }

    for doc in documents {
        std::fs::write(resources.join("Documents").join(doc), "<html/>")?;
    }
    Ok(root)
}

/// A viewer script that leaves a marker file behind when invoked.
fn marker_viewer(
    dir: &Path,
) -> Result<(String, PathBuf), Box<dyn std::error::Error>> {
    let marker = dir.join("viewer-called");
    let script = dir.join("viewer.sh");
    std::fs::write(&script, format!("touch '{}'\n", marker.display()))?;
    Ok((format!("sh {}", script.display()), marker))
}

fn script(
    dir: &Path,
    name: &str,
    body: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let path = dir.join(name);
    std::fs::write(&path, body)?;
    Ok(format!("sh {}", path.display()))
}

fn dashp(args: &[&str]) -> Result<Output, Box<dyn std::error::Error>> {
    dashp_in(&std::env::current_dir()?, args)
}

fn dashp_in(
    cwd: &Path,
    args: &[&str],
) -> Result<Output, Box<dyn std::error::Error>> {
    let output = Command::new(dashp_bin()?)
        .current_dir(cwd)
        .args(args)
        .env_remove("DASHP_DOCSET_DIR")
        .env_remove("DASHP_FINDER")
        .env_remove("DASHP_VIEWER")
        .env_remove("DASHP_LOG")
        .output()?;
    Ok(output)
}

#[test]
fn no_docsets_fails_without_prompting()
-> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let docsets = tmp.path().join("docsets");
    std::fs::create_dir(&docsets)?;
    let prompted = tmp.path().join("prompted");
    let finder = script(
        tmp.path(),
        "finder.sh",
        &format!("touch '{}'\n", prompted.display()),
    )?;

    let output = dashp(&[
        "--docset-dir",
        docsets.to_str().unwrap(),
        "--finder",
        &finder,
    ])?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no usable docsets"), "stderr: {stderr}");
    assert!(!prompted.exists());
    Ok(())
}

#[test]
fn cancellation_exits_cleanly() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    make_docset(
        tmp.path(),
        "Rust",
        &[("Vec", "Struct", "vec.html")],
        &["vec.html"],
    )?;
    let finder =
        script(tmp.path(), "finder.sh", "cat > /dev/null\nexit 130\n")?;
    let (viewer, marker) = marker_viewer(tmp.path())?;

    let output = dashp(&[
        "--docset-dir",
        tmp.path().to_str().unwrap(),
        "--finder",
        &finder,
        "--viewer",
        &viewer,
    ])?;

    assert!(output.status.success());
    assert!(!marker.exists());
    Ok(())
}

#[test]
fn unresolved_entry_fails_without_viewer()
-> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    make_docset(tmp.path(), "Rust", &[("Vec", "Struct", "vec.html")], &[])?;
    let (viewer, marker) = marker_viewer(tmp.path())?;

    let output = dashp(&[
        "--docset-dir",
        tmp.path().to_str().unwrap(),
        "--finder",
        "head -n 1",
        "--viewer",
        &viewer,
    ])?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Vec"), "stderr: {stderr}");
    assert!(stderr.contains("missing file"), "stderr: {stderr}");
    assert!(!marker.exists());
    Ok(())
}

#[test]
fn print_outputs_resolved_path() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let root = make_docset(
        tmp.path(),
        "Rust",
        &[("push", "Method", "vec.html#method.push")],
        &["vec.html"],
    )?;

    let output = dashp(&[
        "--docset-dir",
        tmp.path().to_str().unwrap(),
        "--finder",
        "head -n 1",
        "--print",
    ])?;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let expected = root.join("Contents/Resources/Documents/vec.html");
    assert_eq!(
        stdout.trim_end(),
        format!("{}#method.push", expected.display())
    );
    Ok(())
}

#[test]
fn empty_docsets_exit_without_prompting()
-> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    make_docset(tmp.path(), "Empty", &[], &[])?;
    let prompted = tmp.path().join("prompted");
    let finder = script(
        tmp.path(),
        "finder.sh",
        &format!("touch '{}'\n", prompted.display()),
    )?;

    let output = dashp(&[
        "--docset-dir",
        tmp.path().to_str().unwrap(),
        "--finder",
        &finder,
    ])?;

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("No entries to choose from."),
        "stderr: {stderr}"
    );
    assert!(!stderr.contains("filter"), "stderr: {stderr}");
    assert!(!prompted.exists());
    Ok(())
}

#[test]
fn bare_name_ignores_same_named_cwd_directory()
-> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let docsets = tmp.path().join("docsets");
    std::fs::create_dir(&docsets)?;
    make_docset(&docsets, "Rust", &[("Vec", "Struct", "vec.html")], &[])?;

    let cwd = tmp.path().join("work");
    std::fs::create_dir_all(cwd.join("Rust"))?;

    let output = dashp_in(
        &cwd,
        &["entries", "Rust", "--docset-dir", docsets.to_str().unwrap()],
    )?;

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Vec (Struct, Rust)\n"
    );
    Ok(())
}

#[test]
fn broken_docset_is_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    std::fs::create_dir_all(
        tmp.path().join("Broken.docset/Contents/Resources"),
    )?;
    make_docset(tmp.path(), "Rust", &[("Vec", "Struct", "vec.html")], &[])?;

    let output =
        dashp(&["entries", "--docset-dir", tmp.path().to_str().unwrap()])?;

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Vec (Struct, Rust)\n"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Broken"), "stderr: {stderr}");
    Ok(())
}

#[test]
fn entries_json_keeps_collisions() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    make_docset(tmp.path(), "A", &[("open", "Function", "a.html")], &[])?;
    make_docset(tmp.path(), "B", &[("open", "Function", "b.html#x")], &[])?;

    let output = dashp(&[
        "entries",
        "B",
        "A",
        "--json",
        "--docset-dir",
        tmp.path().to_str().unwrap(),
    ])?;

    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let entries = entries.as_array().expect("array");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["docset"], "B");
    assert_eq!(entries[0]["type"], "Function");
    assert_eq!(entries[0]["anchor"], "x");
    assert_eq!(entries[1]["docset"], "A");
    assert!(entries[1]["anchor"].is_null());
    Ok(())
}

#[test]
fn docsets_lists_status() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    make_docset(
        tmp.path(),
        "Rust",
        &[("Vec", "Struct", "vec.html"), ("Option", "Enum", "option.html")],
        &[],
    )?;
    std::fs::create_dir(tmp.path().join("Empty.docset"))?;

    let output =
        dashp(&["docsets", "--docset-dir", tmp.path().to_str().unwrap()])?;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Empty\terror:"));
    assert_eq!(lines[1], "Rust\t2 entries");
    Ok(())
}

fn dashp_bin() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(bin) = option_env!("CARGO_BIN_EXE_dashp") {
        return Ok(PathBuf::from(bin));
    }

    let mut path = std::env::current_exe()?;
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("dashp");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    Ok(path)
}
