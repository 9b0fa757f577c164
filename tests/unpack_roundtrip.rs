use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::Path;

use prepkit::progress::percent;
use prepkit::{ExtractionError, NoopReporter, Reporter, unpack};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Default)]
struct Collector {
    reports: Vec<(u64, u64)>,
}

impl Reporter for Collector {
    fn report(&mut self, current: u64, total: u64) {
        self.reports.push((current, total));
    }

    fn finish(&mut self) {}
}

fn pack(files: &BTreeMap<String, Vec<u8>>, method: CompressionMethod) -> Vec<u8> {
    let options = FileOptions::default().compression_method(method);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in files {
        writer.start_file(name.as_str(), options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut out = BTreeMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path.strip_prefix(root).unwrap();
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                out.insert(key, std::fs::read(&path).unwrap());
            }
        }
    }
    out
}

fn sample_files() -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    files.insert("README.md".to_string(), b"# checkpoints\n".to_vec());
    files.insert(
        "weights/generator.bin".to_string(),
        (0..70_000u32).map(|i| (i * 31 % 256) as u8).collect(),
    );
    files.insert(
        "weights/nested/config.json".to_string(),
        br#"{"layers": 12, "shape": [512, 512, 3]}"#.repeat(50),
    );
    files.insert("empty.txt".to_string(), Vec::new());
    files
}

#[tokio::test]
async fn test_unpack_reproduces_packed_files() {
    let files = sample_files();

    for method in [CompressionMethod::Stored, CompressionMethod::Deflated] {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("bundle.zip");
        std::fs::write(&archive, pack(&files, method)).unwrap();

        let dest = tmp.path().join("out");
        unpack(&archive, &dest, NoopReporter).await.unwrap();

        assert_eq!(read_tree(&dest), files);
    }
}

#[tokio::test]
async fn test_unpack_scenario_with_subdirectory() {
    let mut files = BTreeMap::new();
    files.insert("a.txt".to_string(), b"abc".to_vec());
    files.insert("b/c.txt".to_string(), b"1234567".to_vec());

    let tmp = tempfile::tempdir().unwrap();
    let archive = tmp.path().join("small.zip");
    std::fs::write(&archive, pack(&files, CompressionMethod::Deflated)).unwrap();

    let dest = tmp.path().join("fresh");
    let mut collector = Collector::default();
    unpack(&archive, &dest, &mut collector).await.unwrap();

    assert_eq!(std::fs::metadata(dest.join("a.txt")).unwrap().len(), 3);
    assert_eq!(std::fs::metadata(dest.join("b").join("c.txt")).unwrap().len(), 7);
    assert!(dest.join("b").is_dir());

    let pcts: Vec<u8> = collector
        .reports
        .iter()
        .map(|&(c, t)| percent(c, t).unwrap())
        .collect();
    assert_eq!(pcts, vec![0, 30]);
}

#[tokio::test]
async fn test_unpack_directory_entries() {
    let tmp = tempfile::tempdir().unwrap();
    let archive = tmp.path().join("dirs.zip");

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .add_directory("only_dir/", FileOptions::default())
        .unwrap();
    std::fs::write(&archive, writer.finish().unwrap().into_inner()).unwrap();

    let dest = tmp.path().join("out");
    unpack(&archive, &dest, NoopReporter).await.unwrap();

    assert!(dest.join("only_dir").is_dir());
}

#[tokio::test]
async fn test_unpack_truncated_archive_fails() {
    let files = sample_files();
    let data = pack(&files, CompressionMethod::Deflated);

    let tmp = tempfile::tempdir().unwrap();
    let archive = tmp.path().join("cut.zip");
    std::fs::write(&archive, &data[..data.len() / 2]).unwrap();

    let err = unpack(&archive, &tmp.path().join("out"), NoopReporter)
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractionError::Malformed(_)));
}
