//! Static corpora and fixture-file helpers used across harnesses.

use std::path::PathBuf;

/// Raw collection dates as they appear in real metadata dumps, with the
/// outcome expected under the `%Y-%m-%d` format.
pub const RAW_DATES_EXACT: &[&str] = &["2016-01-01", "2016-02-29", "2017-12-31", "1968-07-15"];

pub const RAW_DATES_AMBIGUOUS: &[&str] = &["2016-XX-XX", "2016-02-XX", "2016-XX-15", "2017-11-XX"];

pub const RAW_DATES_UNRESOLVABLE: &[&str] = &["XXXX-XX-XX", "XXXX-03-01", "20160101", "spring", "2016-13-01"];

/// Input records for the pipeline harness, pipe-separated headers:
/// `strain|accession|date|region`.
pub const RECORDS_JSON: &str = r#"[
  {"name": "r1", "description": "A/Sydney/1/2016|EPI001|2016-01-10|oceania", "seq": "ac-gt"},
  {"name": "r2", "description": "A/Perth/2/2016|EPI002|2016-01-20|oceania", "seq": "ACGT"},
  {"name": "r3", "description": "A/Perth/3/2016|EPI003|2016-01-25|oceania", "seq": "ACGT"},
  {"name": "r4", "description": "A/Hong Kong/4/2016|EPI004|2016-02-XX|asia", "seq": "acgt"},
  {"name": "r5", "description": "A/Beijing/5/2016|EPI005|2016-03-03|asia", "seq": "ACGT"},
  {"name": "r6", "description": "A/Lima/6/2016|EPI006||south america", "seq": "ACGT"},
  {"name": "r7", "description": "A/Quito/7/2016|EPI007|XXXX-XX-XX|south america", "seq": "ACGT"}
]"#;

/// Pipeline config used with [`RECORDS_JSON`].
pub const PIPELINE_TOML: &str = r#"
segment = "ha"

[header]
separator = "|"

[header.fields]
0 = "strain"
1 = "accession"
2 = "date"
3 = "region"

[dates]
formats = ["%Y-%m-%d"]
prune = true

[subsample]
threshold = 2
seed = 11
"#;

/// Write `contents` to `name` inside `dir` and return the path.
pub fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}
