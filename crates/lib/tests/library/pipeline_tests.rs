//! End-to-end build and install through the public pipeline API.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;
use tinypkg_lib::config::Config;
use tinypkg_lib::execute::{Executor, FetchError, Fetcher, Invocation, ScriptStatus};
use tinypkg_lib::pipeline::{Pipeline, PipelineError};
use tinypkg_lib::registry::Registry;

fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
  let encoder = GzEncoder::new(Vec::new(), Compression::default());
  let mut builder = tar::Builder::new(encoder);
  for (path, contents) in files {
    let mut header = tar::Header::new_gnu();
    header.set_size(contents.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, path, contents.as_bytes()).unwrap();
  }
  builder.into_inner().unwrap().finish().unwrap()
}

/// Serves one archive and remembers which URLs were requested.
struct ArchiveFetcher {
  archive: Vec<u8>,
  urls: RefCell<Vec<String>>,
}

impl Fetcher for ArchiveFetcher {
  fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
    self.urls.borrow_mut().push(url.to_string());
    fs::write(dest, &self.archive).map_err(|source| FetchError::Write {
      path: dest.to_path_buf(),
      source,
    })
  }
}

#[derive(Debug, Clone)]
struct Run {
  working_dir: PathBuf,
  script: String,
}

#[derive(Default)]
struct RecordingExecutor {
  runs: RefCell<Vec<Run>>,
}

impl Executor for RecordingExecutor {
  fn execute(&self, invocation: &Invocation<'_>) -> io::Result<ScriptStatus> {
    fs::write(invocation.log, "")?;
    self.runs.borrow_mut().push(Run {
      working_dir: invocation.working_dir.to_path_buf(),
      script: fs::read_to_string(invocation.script)?,
    });
    Ok(ScriptStatus::from_code(0))
  }
}

fn write_manifest(config: &Config, name: &str, text: &str) {
  let path = config.manifest_path(name);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, text).unwrap();
}

#[test]
fn foo_builds_and_installs_with_prefix() {
  let temp = TempDir::new().unwrap();
  let config = Config::new(temp.path());
  write_manifest(
    &config,
    "foo",
    "name: foo\nsource: \"http://x/foo.tar.gz\"\nbuild: \"make\"\ninstall: \"make install\"\n",
  );
  let fetcher = ArchiveFetcher {
    archive: tar_gz(&[("foo-1.0/Makefile", "all:\n")]),
    urls: RefCell::new(Vec::new()),
  };
  let executor = RecordingExecutor::default();
  let pipeline = Pipeline::with_parts(&config, &fetcher, &executor);

  let built = pipeline.build("foo").unwrap();
  let installed = pipeline.install("foo").unwrap();

  let build_dir = temp.path().join("build").join("foo");
  let prefix = temp.path().join("opt").join("foo");
  assert!(build_dir.join("source.tar.gz").is_file());
  assert_eq!(built.build_dir, build_dir);
  assert_eq!(installed.prefix, prefix);
  assert_eq!(*fetcher.urls.borrow(), vec!["http://x/foo.tar.gz".to_string()]);

  let runs = executor.runs.borrow();
  assert_eq!(runs.len(), 2);
  let export = format!("export PREFIX='{}'\n", prefix.display());
  assert!(runs[0].script.ends_with(&format!("{export}make\n")));
  assert!(runs[1].script.ends_with(&format!("{export}make install\n")));
  assert!(runs.iter().all(|r| r.working_dir == build_dir.join("foo-1.0")));

  assert_eq!(
    fs::read_to_string(temp.path().join("installed").join("installed.db")).unwrap(),
    "foo unknown\n"
  );
  assert!(pipeline.is_installed("foo").unwrap());
}

#[test]
fn install_in_fresh_pipeline_after_earlier_build() {
  let temp = TempDir::new().unwrap();
  let config = Config::new(temp.path());
  write_manifest(&config, "foo", "version: 3\nsource: http://x/foo.tar.gz\ninstall: make install\n");
  let fetcher = ArchiveFetcher {
    archive: tar_gz(&[("foo-3/Makefile", "")]),
    urls: RefCell::new(Vec::new()),
  };

  Pipeline::with_parts(&config, &fetcher, RecordingExecutor::default())
    .build("foo")
    .unwrap();
  let report = Pipeline::with_parts(&config, &fetcher, RecordingExecutor::default())
    .install("foo")
    .unwrap();

  assert!(report.registered);
  assert_eq!(fetcher.urls.borrow().len(), 1);
  assert_eq!(Registry::open(&config).version_of("foo").unwrap().as_deref(), Some("3"));
}

#[test]
#[cfg(unix)]
fn real_shell_build_and_install() {
  let temp = TempDir::new().unwrap();
  let config = Config::new(temp.path());
  write_manifest(
    &config,
    "tool",
    "name: tool\n\
     version: 0.2\n\
     source: http://x/tool.tar.gz\n\
     build: |\n\
     \x20 printf '#!/bin/sh\\necho tool\\n' > tool\n\
     \x20 chmod +x tool\n\
     install: |\n\
     \x20 mkdir -p \"$PREFIX/bin\"\n\
     \x20 cp tool \"$PREFIX/bin/tool\"\n",
  );
  let fetcher = ArchiveFetcher {
    archive: tar_gz(&[("tool-0.2/README", "tool\n")]),
    urls: RefCell::new(Vec::new()),
  };
  let pipeline = Pipeline::with_parts(&config, fetcher, tinypkg_lib::execute::ShellExecutor);

  pipeline.build("tool").unwrap();
  pipeline.install("tool").unwrap();

  let installed = config.package_prefix("tool").join("bin").join("tool");
  assert_eq!(fs::read_to_string(installed).unwrap(), "#!/bin/sh\necho tool\n");
  assert_eq!(Registry::open(&config).version_of("tool").unwrap().as_deref(), Some("0.2"));

  let removed = pipeline.remove("tool").unwrap();
  assert!(removed.unregistered);
  assert!(!config.package_prefix("tool").exists());
  assert!(matches!(
    pipeline.remove("tool"),
    Err(PipelineError::NotInstalled { .. })
  ));
}

#[test]
#[cfg(unix)]
fn real_shell_failure_keeps_registry_clean() {
  let temp = TempDir::new().unwrap();
  let config = Config::new(temp.path());
  write_manifest(
    &config,
    "bad",
    "source: http://x/bad.tar.gz\nbuild: true\ninstall: |\n  echo partial\n  false\n  echo unreachable\n",
  );
  let fetcher = ArchiveFetcher {
    archive: tar_gz(&[("bad/README", "")]),
    urls: RefCell::new(Vec::new()),
  };
  let pipeline = Pipeline::with_parts(&config, fetcher, tinypkg_lib::execute::ShellExecutor);
  pipeline.build("bad").unwrap();

  let err = pipeline.install("bad").unwrap_err();

  assert_eq!(err.package(), "bad");
  assert_eq!(err.log_tail().unwrap(), &["partial".to_string()]);
  assert!(!pipeline.is_installed("bad").unwrap());
  assert!(!config.registry_path().exists());
}

#[test]
fn rebuild_after_version_bump_installs_new_tree() {
  let temp = TempDir::new().unwrap();
  let config = Config::new(temp.path());
  let executor = RecordingExecutor::default();

  write_manifest(&config, "foo", "version: 1.0\nsource: http://x/foo-1.0.tar.gz\nbuild: make\ninstall: make install\n");
  let old = ArchiveFetcher {
    archive: tar_gz(&[("foo-1.0/Makefile", "all:\n")]),
    urls: RefCell::new(Vec::new()),
  };
  Pipeline::with_parts(&config, &old, &executor).build("foo").unwrap();

  write_manifest(&config, "foo", "version: 1.1\nsource: http://x/foo-1.1.tar.gz\nbuild: make\ninstall: make install\n");
  let new = ArchiveFetcher {
    archive: tar_gz(&[("foo-1.1/Makefile", "all:\n")]),
    urls: RefCell::new(Vec::new()),
  };
  let pipeline = Pipeline::with_parts(&config, &new, &executor);
  pipeline.build("foo").unwrap();
  let report = pipeline.install("foo").unwrap();

  let build_dir = config.package_build_dir("foo");
  assert!(build_dir.join("foo-1.0").is_dir());
  assert_eq!(report.version, "1.1");
  let runs = executor.runs.borrow();
  assert_eq!(runs.len(), 3);
  assert_eq!(runs[1].working_dir, build_dir.join("foo-1.1"));
  assert_eq!(runs[2].working_dir, build_dir.join("foo-1.1"));
  assert_eq!(Registry::open(&config).version_of("foo").unwrap().as_deref(), Some("1.1"));
}
