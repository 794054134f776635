use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_hicspec"))
}

fn repo_root() -> PathBuf {
    // crates/hs-cli -> repo root
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").canonicalize().unwrap()
}

fn tmp_path(filename: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("hicspec_cli_{}_{}_{}", std::process::id(), nanos, filename));
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .current_dir(repo_root())
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

/// NDJSON rows with one proton each; `(Nc, b)` per row. Momenta per nucleon, cms.
fn write_table(name: &str, rows: &[(i32, f64)]) -> PathBuf {
    let path = tmp_path(name);
    let body: String = rows
        .iter()
        .map(|(nc, b)| {
            format!(
                "{{\"multi\":1,\"b\":{b},\"Nc\":{nc},\"N\":[0],\"Z\":[1],\"px\":[100.0],\"py\":[0.0],\"pz\":[150.0]}}\n"
            )
        })
        .collect();
    std::fs::write(&path, body).unwrap();
    path
}

fn read_json(path: &PathBuf) -> serde_json::Value {
    let bytes = std::fs::read(path).unwrap();
    serde_json::from_slice(&bytes).expect("output should be valid JSON")
}

fn set<'a>(v: &'a serde_json::Value, name: &str) -> &'a serde_json::Value {
    v["sets"]
        .as_array()
        .expect("sets should be an array")
        .iter()
        .find(|s| s["name"] == name)
        .unwrap_or_else(|| panic!("missing set {name}"))
}

#[test]
fn spectra_writes_three_sets() {
    let primary = write_table("prim.jsonl", &[(10, 1.0), (10, 1.0)]);
    let decayed =
        write_table("seq.jsonl", &[(10, 1.0), (10, 1.0), (10, 1.0), (40, 1.0), (10, 5.0), (0, 1.0)]);
    let output = tmp_path("spectra.json");

    let out = run(&[
        "spectra",
        "--reaction",
        "Ca48Ni64E140",
        "--primary",
        primary.to_str().unwrap(),
        "--decayed",
        decayed.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let v = read_json(&output);
    assert_eq!(v["reaction"], "Ca48Ni64E140");
    assert_eq!(v["n_decays"], 3);
    assert!(v["betacms"].as_f64().unwrap() > 0.0);

    let prim = set(&v, "prim");
    assert!((prim["effective_weight"].as_f64().unwrap() - 1.0).abs() < 1e-12);
    let hists = prim["histograms"].as_array().unwrap();
    assert_eq!(hists.len(), 8);
    assert!(hists.iter().any(|h| h["name"] == "h2_pt_rapidity_prim_coal_p"));
    assert_eq!(hists[0]["content"].as_array().unwrap().len(), 100 * 600);

    assert!((set(&v, "seq1")["effective_weight"].as_f64().unwrap() - 2.0).abs() < 1e-12);

    for p in [primary, decayed, output] {
        let _ = std::fs::remove_file(p);
    }
}

#[test]
fn anal_aggregates_pairs() {
    let primary = write_table("a_prim.jsonl", &[(10, 1.0)]);
    let decayed = write_table("a_seq.jsonl", &[(10, 1.0), (40, 1.0)]);
    let output = tmp_path("anal.json");
    let (p, d) = (primary.to_str().unwrap(), decayed.to_str().unwrap());

    let out = run(&[
        "anal", "--reaction", "Ca48Ni64E140", "--primary", p, p, p, "--decayed", d, d, d,
        "--threads", "2", "--output", output.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let v = read_json(&output);
    assert!((set(&v, "prim")["effective_weight"].as_f64().unwrap() - 1.5).abs() < 1e-12);
    assert_eq!(set(&v, "seq")["events"], 3);

    for p in [primary, decayed, output] {
        let _ = std::fs::remove_file(p);
    }
}

#[test]
fn anal_rejects_mismatched_lists() {
    let primary = write_table("m_prim.jsonl", &[(10, 1.0)]);
    let p = primary.to_str().unwrap();
    let out = run(&[
        "anal", "--reaction", "Ca48Ni64E140", "--primary", p, p, "--decayed", p, "--output",
        tmp_path("never.json").to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("primary files"));
    let _ = std::fs::remove_file(primary);
}

#[test]
fn missing_input_fails() {
    let out = run(&[
        "spectra",
        "--reaction",
        "Ca48Ni64E140",
        "--primary",
        tmp_path("missing_prim.jsonl").to_str().unwrap(),
        "--decayed",
        tmp_path("missing_seq.jsonl").to_str().unwrap(),
        "--output",
        tmp_path("never.json").to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("does not exist"));
}

#[test]
fn bad_reaction_label_fails() {
    let table = write_table("r_prim.jsonl", &[(10, 1.0)]);
    let t = table.to_str().unwrap();
    let out = run(&[
        "spectra", "--reaction", "Calcium48", "--primary", t, "--decayed", t, "--output",
        tmp_path("never.json").to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("bad reaction label"));
    let _ = std::fs::remove_file(table);
}

#[test]
fn filter_writes_one_row_per_event() {
    // Rejected or not, every event gets a row.
    let input = write_table("f_raw.jsonl", &[(10, 1.0), (10, 2.0), (10, 7.0)]);
    let output = tmp_path("filtered.jsonl");
    let out = run(&[
        "filter",
        "--reaction",
        "Ca48Ni64E140",
        "--input",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let text = std::fs::read_to_string(&output).unwrap();
    let rows: Vec<serde_json::Value> =
        text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2]["b"], 7.0);
    for row in &rows {
        let uball = &row["uball"];
        assert_eq!(uball["multi"].as_u64().unwrap() as usize, uball["Z"].as_array().unwrap().len());
        assert!(row["hira"]["N"].is_array());
    }

    let _ = std::fs::remove_file(input);
    let _ = std::fs::remove_file(output);
}

#[test]
fn yields_from_spectra_output() {
    let primary = write_table("y_prim.jsonl", &[(10, 1.0)]);
    let decayed = write_table("y_seq.jsonl", &[(10, 1.0)]);
    let spectra = tmp_path("y_spectra.json");
    let report = tmp_path("y_report.json");

    let out = run(&[
        "spectra",
        "--reaction",
        "Ca48Ni64E140",
        "--primary",
        primary.to_str().unwrap(),
        "--decayed",
        decayed.to_str().unwrap(),
        "--output",
        spectra.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let out = run(&[
        "yields",
        "--input",
        spectra.to_str().unwrap(),
        "--output",
        report.to_str().unwrap(),
        "--y-min",
        "0.0",
        "--y-max",
        "1.0",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let v = read_json(&report);
    assert_eq!(v["reaction"], "Ca48Ni64E140");
    assert_eq!(v["options"]["neutrons"], "pseudo");
    let spectra_list = v["spectra"].as_array().unwrap();
    for name in ["p", "pseudo_n", "n/p", "T_chem", "coal_n", "coal_p"] {
        assert!(spectra_list.iter().any(|s| s["name"] == name), "missing {name}");
    }
    let p = spectra_list.iter().find(|s| s["name"] == "p").unwrap();
    assert_eq!(p["y"].as_array().unwrap().len(), 30);
    let total: f64 = p["y"].as_array().unwrap().iter().map(|y| y.as_f64().unwrap()).sum();
    assert!(total > 0.0);

    let out = run(&[
        "yields",
        "--input",
        spectra.to_str().unwrap(),
        "--output",
        tmp_path("never.json").to_str().unwrap(),
        "--set",
        "missing",
    ]);
    assert!(!out.status.success());

    for p in [primary, decayed, spectra, report] {
        let _ = std::fs::remove_file(p);
    }
}
