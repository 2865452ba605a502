#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use bankstmt::{cmd::{run_with_args, Args}, util::rw::WriteHandle};

/// A fresh, empty directory under the system temp dir. Removed on drop.
pub struct TestDir {
    pub path: PathBuf,
}

impl TestDir {
    pub fn new() -> TestDir {
        let tmpdir = std::env::temp_dir();
        for val in 1..1000000 {
            let path = tmpdir.join(format!("bankstmt-test-{}-{}", std::process::id(), val));
            // create_dir fails if another test got there first
            if fs::create_dir(&path).is_ok() {
                return TestDir { path };
            }
        }
        panic!("Could not create a temp directory that does not already exist");
    }
}

fn cleanup_test_dir(path: &Path) {
    if !path.exists() {
        return;
    }
    let skip_env_var = "SKIP_TEMP_DIR_CLEANUP_ON_FAIL";
    let skip_del_on_fail = bankstmt::util::sys::env_var_non_empty(skip_env_var);

    if std::thread::panicking() && skip_del_on_fail {
        println!("cleanup_test_dir: panicking. Skipping remove of {:?}", path);
    } else {
        let _ = fs::remove_dir_all(path);
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        cleanup_test_dir(&self.path);
    }
}

pub fn statements_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/statements")
}

pub fn read_fixture(name: &str) -> String {
    fs::read_to_string(statements_dir().join(name)).unwrap()
}

pub fn copy_fixture(name: &str, dest: &Path) {
    fs::copy(statements_dir().join(name), dest).unwrap();
}

/// Runs the CLI entry point, returning (result, stdout, stderr).
pub fn run_and_get_output(args: Args) -> (Result<(), ()>, String, String) {
    let (out_w, out_b) = WriteHandle::string_buff_write_handle();
    let (err_w, err_b) = WriteHandle::string_buff_write_handle();
    let res = run_with_args(args, out_w, err_w);
    let out = out_b.borrow_mut().export_string();
    let err = err_b.borrow_mut().export_string();
    (res, out, err)
}

/// Stands in for pdftotext. It prints the text of the ".layout" file next
/// to the input PDF, with a few behaviours picked by file name:
///   *broken*   fails like a corrupt PDF
///   *slow*     hangs
///   *password* needs the user password 123abc
#[cfg(unix)]
pub fn write_fake_pdftotext(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    const SCRIPT: &str = r#"#!/bin/sh
pw=""
input=""
while [ $# -gt 0 ]; do
  case "$1" in
    -layout) shift ;;
    -upw) pw="$2"; shift 2 ;;
    -) shift ;;
    *) input="$1"; shift ;;
  esac
done
case "$input" in
  *broken*)
    echo "Syntax Error: Couldn't read xref table" >&2
    exit 1 ;;
  *slow*)
    sleep 30 ;;
  *password*)
    if [ "$pw" != "123abc" ]; then
      echo "Command Line Error: Incorrect password" >&2
      exit 1
    fi ;;
esac
cat "${input%.pdf}.layout"
"#;

    let path = dir.join("fake-pdftotext");
    fs::write(&path, SCRIPT).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Places a fake PDF for `fixture` in `dir` as `pdf_name`.
pub fn add_fake_pdf(dir: &Path, pdf_name: &str, fixture: &str) -> PathBuf {
    let pdf_path = dir.join(pdf_name);
    fs::write(&pdf_path, b"%PDF-1.4\n").unwrap();
    copy_fixture(fixture, &pdf_path.with_extension("layout"));
    pdf_path
}
