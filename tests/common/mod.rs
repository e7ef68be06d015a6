//! Shared test fixtures: a fake Alpino home with shell-script stand-ins
//! for the external tools, so the full pipeline can be exercised without a
//! real Alpino installation.

#![allow(dead_code)] // not every test binary uses every fixture

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use alpino_server::config::Config;
use alpino_server::pipeline::ParsePipeline;
use tempfile::TempDir;

/// Echoes stdin and appends a stray `|`, which the tokenizer adapter must
/// strip.
pub const DEFAULT_TOK: &str = "#!/bin/sh\ncat\nprintf '|'\n";

/// Fake Alpino covering all three invocation shapes. The dependencies hook
/// drops a marker file so tests can prove it did (or did not) run; the xml
/// hook records the treebank directory it was given so tests can prove the
/// workspace was removed afterwards.
pub const DEFAULT_ALPINO: &str = r#"#!/bin/sh
case "$1" in
  end_hook=dependencies)
    cat > /dev/null
    : > parsed.marker
    printf 'dit|det|test|1\nis|hd|test|1\n'
    ;;
  end_hook=xml)
    cat > /dev/null
    dir="$5"
    printf '%s\n' "$dir" > last_treebank
    printf '<node id="1"/>' > "$dir/1.xml"
    printf '<node id="2"/>' > "$dir/2.xml"
    ;;
  -treebank_triples)
    shift
    for f in "$@"; do
      printf 'dit|det|test|%s\n' "$f"
    done
    ;;
esac
"#;

/// Fake Alpino whose xml hook writes no files at all.
pub const EMPTY_XML_ALPINO: &str = r#"#!/bin/sh
case "$1" in
  end_hook=xml)
    cat > /dev/null
    dir="$5"
    printf '%s\n' "$dir" > last_treebank
    ;;
  *)
    cat > /dev/null
    ;;
esac
"#;

/// Fake Alpino whose xml hook works but whose treebank_triples mode emits
/// nothing, so the second assembly phase fails after the first succeeded.
pub const MUTE_TREEBANK_ALPINO: &str = r#"#!/bin/sh
case "$1" in
  end_hook=xml)
    cat > /dev/null
    dir="$5"
    printf '%s\n' "$dir" > last_treebank
    printf '<node id="1"/>' > "$dir/1.xml"
    ;;
  -treebank_triples)
    ;;
  *)
    cat > /dev/null
    ;;
esac
"#;

/// Fake Alpino that exits silently on every invocation.
pub const SILENT_ALPINO: &str = "#!/bin/sh\ncat > /dev/null\n";

pub fn fake_home(alpino_script: &str, tok_script: &str) -> TempDir {
    let home = TempDir::with_prefix("alpino-home-").expect("create fake home");
    write_tool(&home.path().join("bin/Alpino"), alpino_script);
    write_tool(&home.path().join("Tokenization/tok"), tok_script);
    home
}

pub fn write_tool(path: &Path, script: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, script).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

pub fn config_for(home: &TempDir) -> Config {
    Config::for_home(home.path().to_path_buf())
}

pub fn pipeline_for(home: &TempDir) -> ParsePipeline {
    ParsePipeline::new(Arc::new(config_for(home)))
}

/// The treebank directory recorded by the fake xml hook.
pub fn recorded_workspace(home: &TempDir) -> String {
    fs::read_to_string(home.path().join("last_treebank"))
        .expect("xml hook should record its workspace")
        .trim()
        .to_string()
}
