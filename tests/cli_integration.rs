//! CLI integration tests
//!
//! Tests the command-line interface end-to-end.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Get path to the multicrypt binary
fn multicrypt_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_multicrypt"))
}

/// Run multicrypt in `dir` with the password fed through stdin
fn run_multicrypt_with_password(
    dir: &Path,
    args: &[&str],
    stdin_data: &str,
) -> Result<std::process::Output, std::io::Error> {
    let mut child = Command::new(multicrypt_bin())
        .arg("--password-stdin")
        .arg("-C")
        .arg(dir)
        .args(args)
        .env_remove("MULTICRYPT_PASSWORD")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        // Ignore BrokenPipe errors - the command may exit before reading stdin
        let _ = stdin.write_all(stdin_data.as_bytes());
    }

    child.wait_with_output()
}

fn write_project(dir: &Path, ignore: &str, files: &[(&str, &[u8])]) {
    fs::write(dir.join(".gitignore"), ignore).unwrap();
    for (name, contents) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}

#[test]
fn test_encrypt_decrypt_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let large = vec![0x42u8; 256 * 1024];
    write_project(
        dir,
        "target/\n# Secret files\n.env\nconfig/keys.json\nlarge.bin\n",
        &[
            (".env", b"API_KEY=abc123\n"),
            ("config/keys.json", b"{\"key\": \"value\"}"),
            ("large.bin", &large),
        ],
    );

    let result = run_multicrypt_with_password(dir, &["encrypt"], "test\n").unwrap();
    assert!(
        result.status.success(),
        "encrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Encrypting .env..."));
    assert!(stdout.contains("3 file(s) encrypted."));
    assert!(stdout.contains("encrypted.json"));
    assert!(dir.join("encrypted.json").exists());
    assert!(!dir.join("multi-encrypt-tempfile").exists());

    fs::remove_file(dir.join(".env")).unwrap();
    fs::remove_file(dir.join("config/keys.json")).unwrap();
    fs::remove_file(dir.join("large.bin")).unwrap();

    let result = run_multicrypt_with_password(dir, &["decrypt"], "test\n").unwrap();
    assert!(
        result.status.success(),
        "decrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert!(String::from_utf8_lossy(&result.stdout).contains("3 file(s) decrypted."));

    assert_eq!(fs::read(dir.join(".env")).unwrap(), b"API_KEY=abc123\n");
    assert_eq!(
        fs::read(dir.join("config/keys.json")).unwrap(),
        b"{\"key\": \"value\"}"
    );
    assert_eq!(fs::read(dir.join("large.bin")).unwrap(), large);
    assert!(!dir.join("multi-encrypt-tempfile").exists());
}

#[test]
fn test_missing_file_is_reported_and_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write_project(
        dir,
        "# secret\na.txt\nmissing.txt\nb.txt\n",
        &[("a.txt", b"a"), ("b.txt", b"b")],
    );

    let result = run_multicrypt_with_password(dir, &["encrypt"], "test\n").unwrap();

    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert_eq!(stdout.matches("File not found:").count(), 1);
    assert!(stdout.contains("File not found: missing.txt"));
    assert!(stdout.contains("2 file(s) encrypted."));
}

#[test]
fn test_wrong_password_aborts_with_bad_decrypt() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write_project(
        dir,
        "# secret\nfirst.txt\nsecond.txt\n",
        &[("first.txt", b"first"), ("second.txt", b"second")],
    );
    let result = run_multicrypt_with_password(dir, &["encrypt"], "correct_password\n").unwrap();
    assert!(result.status.success());
    fs::remove_file(dir.join("first.txt")).unwrap();
    fs::remove_file(dir.join("second.txt")).unwrap();

    let result = run_multicrypt_with_password(dir, &["decrypt"], "wrong_password\n").unwrap();

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(
        stderr.contains("BadDecrypt"),
        "Expected BadDecrypt diagnostic, got: {}",
        stderr
    );
    assert_eq!(fs::read(dir.join("first.txt")).unwrap(), b"");
    assert!(!dir.join("second.txt").exists());
    assert!(!dir.join("multi-encrypt-tempfile").exists());
}

#[test]
fn test_decrypt_without_manifest_fails() {
    let temp_dir = TempDir::new().unwrap();

    let result = run_multicrypt_with_password(temp_dir.path(), &["decrypt"], "test\n").unwrap();

    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("encrypted.json"));
}

#[test]
fn test_bad_algorithm_writes_no_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write_project(dir, "# secret\na.txt\n", &[("a.txt", b"a")]);

    let result =
        run_multicrypt_with_password(dir, &["encrypt", "--algorithm", "rot13"], "test\n").unwrap();

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("BadAlgorithm"), "got: {}", stderr);
    assert!(!dir.join("encrypted.json").exists());
}

#[test]
fn test_bad_digest() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write_project(dir, "# secret\na.txt\n", &[("a.txt", b"a")]);

    let result =
        run_multicrypt_with_password(dir, &["encrypt", "--digest", "md4"], "test\n").unwrap();

    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("BadDigest"));
}

#[test]
fn test_cipher_options_must_match() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write_project(dir, "# secret\na.txt\n", &[("a.txt", b"salted")]);

    let result = run_multicrypt_with_password(
        dir,
        &["encrypt", "--salt", "pepper", "--iterations", "2000"],
        "test\n",
    )
    .unwrap();
    assert!(result.status.success());

    let result = run_multicrypt_with_password(dir, &["decrypt"], "test\n").unwrap();
    assert_eq!(result.status.code(), Some(1));

    let result = run_multicrypt_with_password(
        dir,
        &["decrypt", "--salt", "pepper", "--iterations", "2000"],
        "test\n",
    )
    .unwrap();
    assert!(result.status.success());
    assert_eq!(fs::read(dir.join("a.txt")).unwrap(), b"salted");
}

#[test]
fn test_blank_password_lines_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write_project(dir, "# secret\na.txt\n", &[("a.txt", b"a")]);

    let result = run_multicrypt_with_password(dir, &["encrypt"], "\n\ntest\n").unwrap();
    assert!(result.status.success());

    let result = run_multicrypt_with_password(dir, &["decrypt"], "test\n").unwrap();
    assert!(result.status.success());
}

#[test]
fn test_no_password_fails() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write_project(dir, "# secret\na.txt\n", &[("a.txt", b"a")]);

    let result = run_multicrypt_with_password(dir, &["encrypt"], "").unwrap();

    assert_eq!(result.status.code(), Some(1));
    assert!(!dir.join("encrypted.json").exists());
}

#[test]
fn test_list_algorithms() {
    let output = Command::new(multicrypt_bin())
        .arg("--algorithms")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("aes-256-cbc"));
}

#[test]
fn test_list_hashes() {
    let output = Command::new(multicrypt_bin())
        .arg("--hashes")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sha256"));
    assert!(!stdout.contains("aes-256-cbc"));
}

#[test]
fn test_list_flags_conflict() {
    let output = Command::new(multicrypt_bin())
        .args(["--algorithms", "--hashes"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot be used with"));
    assert!(output.stdout.is_empty());
}
