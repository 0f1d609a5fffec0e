#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{tempdir, TempDir};

/// Mixed sheet: synonym headers in odd casing, one extra column, a numeric
/// id, a garbage count and an id outside the region tables.
pub const SAMPLE_CSV: &str = "\
 ID SLS ,Nama SLS,Jumlah Usaha PLKUMKM,Jumlah Usaha KDM,Selisih Jumlah Usaha,Keterangan
3576010001001,[12] Foo,10,8,-2,a
3576010004002,[3] Bar,4,9,5,b
3576020003001,Baz,7,7,0,c
3576021005004,[44] Qux,3,8,5,d
3599999999001,[9] Luar,1,,oops,e
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }
}
