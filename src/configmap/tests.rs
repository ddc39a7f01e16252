use super::*;
use crate::properties::Properties;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_values(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("values.yaml");
    std::fs::write(&path, content).unwrap();
    path
}

/// Run a full in-place update and return the resulting file content.
fn run(props: &str, values: &str, remove_unmatched: bool) -> (String, MergeReport) {
    let dir = tempfile::tempdir().unwrap();
    let values_path = write_values(&dir, values);
    let properties = Properties::parse(props);
    let report =
        update_configmap(&properties, &values_path, &values_path, remove_unmatched).unwrap();
    (std::fs::read_to_string(&values_path).unwrap(), report)
}

#[test]
fn adds_new_keys_at_the_end_of_the_section() {
    let (content, report) = run(
        "b=2\nc=3\n",
        "configmap:\n  a: \"1\"\nother: x\n",
        false,
    );
    assert_eq!(
        content,
        "configmap:\n  a: \"1\"\n  b: \"2\"\n  c: \"3\"\nother: x\n"
    );
    assert_eq!(report.outcome.added, 2);
    assert!(report.written);
}

#[test]
fn updates_entries_in_place() {
    let values = concat!(
        "configmap:\n",
        "  # about a\n",
        "  a: \"old\"   # keep\n",
        "  b: \"2\"\n",
    );
    let (content, report) = run("a=new\nb=2\n", values, false);
    assert_eq!(
        content,
        "configmap:\n  # about a\n  a: \"new\"   # keep\n  b: \"2\"\n"
    );
    assert_eq!(report.outcome.updated, 1);
    assert_eq!(report.outcome.added, 0);
}

#[test]
fn matching_content_is_left_alone_regardless_of_style() {
    // Plain, single- and double-quoted entries all carry the same content
    // their properties produce; nothing is dirty and nothing is written.
    let values = "configmap:\n  a: hello\n  b: 'two'\n  c: \"three\"\n";
    let (content, report) = run("a=hello\nb=two\nc=three\n", values, true);
    assert_eq!(content, values);
    assert!(!report.written);
    assert_eq!(report.outcome, MergeOutcome::default());
}

#[test]
fn removes_unmatched_keys_when_asked() {
    let (content, report) = run("a=1\n", "configmap:\n  a: \"1\"\n  b: \"2\"\n", true);
    assert_eq!(content, "configmap:\n  a: \"1\"\n");
    assert_eq!(report.outcome.removed, 1);
    assert!(report.written);
}

#[test]
fn keeps_unmatched_keys_without_the_remove_flag() {
    let (content, report) = run("a=1\n", "configmap:\n  a: \"1\"\n  b: \"2\"\n", false);
    assert_eq!(content, "configmap:\n  a: \"1\"\n  b: \"2\"\n");
    assert!(!report.written);
}

#[test]
fn removing_zero_keys_is_not_a_change() {
    let (content, report) = run("a=1\n", "configmap:\n  a: \"1\"\n", true);
    assert_eq!(content, "configmap:\n  a: \"1\"\n");
    assert!(!report.written);
}

#[test]
fn no_op_merge_creates_no_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let values_path = write_values(&dir, "configmap:\n  a: \"1\"\n");
    let out_path = dir.path().join("out.yaml");
    let properties = Properties::parse("a=1\n");

    let report = update_configmap(&properties, &values_path, &out_path, true).unwrap();
    assert!(!report.written);
    assert!(!out_path.exists());
}

#[test]
fn writes_to_a_separate_output_leave_the_source_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let values_path = write_values(&dir, "configmap:\n  a: \"1\"\n");
    let out_path = dir.path().join("out.yaml");
    let properties = Properties::parse("a=2\n");

    let report = update_configmap(&properties, &values_path, &out_path, true).unwrap();
    assert!(report.written);
    assert_eq!(
        std::fs::read_to_string(&values_path).unwrap(),
        "configmap:\n  a: \"1\"\n"
    );
    assert_eq!(
        std::fs::read_to_string(&out_path).unwrap(),
        "configmap:\n  a: \"2\"\n"
    );
}

#[test]
fn second_run_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let values = concat!(
        "configmap:\n",
        "  keep: hello\n",
        "  change: \"old\"\n",
        "  boolish: yes\n",
        "  gone: \"x\"\n",
    );
    let values_path = write_values(&dir, values);
    let properties = Properties::parse("keep=hello\nchange=new\nboolish=yes\nfresh=1\n");

    let first = update_configmap(&properties, &values_path, &values_path, true).unwrap();
    assert!(first.written);

    let second = update_configmap(&properties, &values_path, &values_path, true).unwrap();
    assert!(!second.written);
    assert_eq!(second.outcome, MergeOutcome::default());
}

#[test]
fn untouched_lines_survive_a_dirty_merge_byte_for_byte() {
    let values = concat!(
        "# deployment values\n",
        "image: app:1.2\n",
        "\n",
        "configmap:\n",
        "  # tuning\n",
        "  keep: \"as-is\"   # pinned\n",
        "\n",
        "replicas: 3\n",
    );
    let (content, report) = run("keep=as-is\nadded=1\n", values, false);
    assert!(report.written);
    assert_eq!(
        content,
        concat!(
            "# deployment values\n",
            "image: app:1.2\n",
            "\n",
            "configmap:\n",
            "  # tuning\n",
            "  keep: \"as-is\"   # pinned\n",
            "  added: \"1\"\n",
            "\n",
            "replicas: 3\n",
        )
    );
}

#[test]
fn multiline_property_lands_as_a_literal_block() {
    let (content, _) = run("servers=[\n  a,/\n  b\n]\n", "configmap:\n", false);
    assert_eq!(
        content,
        concat!(
            "configmap:\n",
            "  servers: |-\n",
            "    [\n",
            "      a,\n",
            "      b\n",
            "    ]\n",
        )
    );
}

#[test]
fn quoted_properties_keep_their_quote_style() {
    let (content, _) = run("dq=\"hello\"\nsq='hello'\n", "configmap:\n", false);
    assert_eq!(content, "configmap:\n  dq: \"hello\"\n  sq: 'hello'\n");
}

#[test]
fn bare_and_empty_properties_render_quoted_and_plain() {
    let (content, _) = run("port=8080\nflag=\n", "configmap:\n", false);
    assert_eq!(content, "configmap:\n  port: \"8080\"\n  flag:\n");
}

#[test]
fn empty_property_value_is_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let values_path = write_values(&dir, "configmap:\n");
    let properties = Properties::parse("flag=\n");

    let first = update_configmap(&properties, &values_path, &values_path, true).unwrap();
    assert!(first.written);
    assert_eq!(
        std::fs::read_to_string(&values_path).unwrap(),
        "configmap:\n  flag:\n"
    );

    let second = update_configmap(&properties, &values_path, &values_path, true).unwrap();
    assert!(!second.written);
}

#[test]
fn non_string_scalars_are_rewritten_to_match_their_property() {
    let values = "configmap:\n  enabled: yes\n  port: 8080\n  empty: ~\n";
    let (content, report) = run("enabled=yes\nport=8080\nempty=\n", values, false);
    assert_eq!(
        content,
        "configmap:\n  enabled: \"yes\"\n  port: \"8080\"\n  empty:\n"
    );
    assert_eq!(report.outcome.updated, 3);
}

#[test]
fn nested_mappings_are_replaced_whole_when_their_key_matches() {
    let values = concat!(
        "configmap:\n",
        "  block:\n",
        "    child: 1\n",
        "    other: 2\n",
        "  after: \"x\"\n",
    );
    let (content, _) = run("block=flat\nafter=x\n", values, false);
    assert_eq!(content, "configmap:\n  block: \"flat\"\n  after: \"x\"\n");
}

#[test]
fn missing_configmap_key_is_created_at_the_end() {
    let (content, report) = run("a=1\n", "image: app:1.2\n", true);
    assert_eq!(content, "image: app:1.2\nconfigmap:\n  a: \"1\"\n");
    assert_eq!(report.outcome.added, 1);
}

#[test]
fn empty_flow_configmap_becomes_a_block() {
    let (content, _) = run("a=1\n", "configmap: {}\n", false);
    assert_eq!(content, "configmap:\n  a: \"1\"\n");
}

#[test]
fn explicit_null_configmap_gains_entries() {
    let (content, report) = run("a=1\n", "configmap: null\n", false);
    assert_eq!(content, "configmap:\n  a: \"1\"\n");
    assert_eq!(report.outcome.added, 1);
}

#[test]
fn matching_values_leave_deep_comments_in_place() {
    let values = concat!(
        "configmap:\n",
        "  a: \"1\"\n",
        "      # retained note\n",
        "  b: \"2\"\n",
    );
    let (content, report) = run("a=1\nb=2\n", values, true);
    assert_eq!(content, values);
    assert!(!report.written);
    assert_eq!(report.outcome, MergeOutcome::default());
}

#[test]
fn new_entries_follow_the_observed_indentation() {
    let (content, _) = run(
        "a=1\nb=2\n",
        "configmap:\n    a: \"1\"\n",
        false,
    );
    assert_eq!(content, "configmap:\n    a: \"1\"\n    b: \"2\"\n");
}

#[test]
fn removal_leaves_neighboring_comments() {
    let values = concat!(
        "configmap:\n",
        "  # explains b\n",
        "  b: \"2\"\n",
        "\n",
        "  a: \"1\"\n",
    );
    let (content, _) = run("a=1\n", values, true);
    assert_eq!(content, "configmap:\n  # explains b\n\n  a: \"1\"\n");
}

#[test]
fn properties_order_decides_append_order() {
    let (content, _) = run("z=26\nm=13\na=1\n", "configmap:\n", false);
    assert_eq!(
        content,
        "configmap:\n  z: \"26\"\n  m: \"13\"\n  a: \"1\"\n"
    );
}
