use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

const CONFIG: &str = "\
[clean]
sub_hourly = true

[analysis]
resolution_label = \"10 mins\"
period = 7
";

fn run_bin(args: &[&str]) -> Output {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_kwh-eda"));

    Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command")
}

fn assert_success(output: &Output, args: &[&str]) {
    let stdout_str = String::from_utf8_lossy(&output.stdout);
    let stderr_str = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );
}

fn create_project(name: &str, data: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir_all(test_dir.join("data")).expect("failed to create test directory");

    fs::write(test_dir.join("config.toml"), CONFIG).expect("failed to write config file");
    fs::write(test_dir.join("data").join("usage.csv"), data).expect("failed to write data file");

    test_dir
}

fn read_json(file: &Path) -> serde_json::Value {
    let contents = fs::read_to_string(file).expect("failed to read chart file");
    serde_json::from_str(&contents).expect("failed to parse chart file")
}

#[test]
fn basic_workflow() {
    // 06-01-2020 is a Monday, 11-01-2020 a Saturday.
    let test_dir = create_project(
        "basic_workflow",
        "Datetime,kwh\n\
         06-01-2020 10:10,0.3\n\
         06-01-2020 10:00,0.25\n\
         06-01-2020 10:00,0.75\n\
         06-01-2020 10:20,1.5\n\
         11-01-2020 10:00,0.5\n",
    );
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    let args = ["--project-dir", test_dir_str, "clean"];
    assert_success(&run_bin(&args), &args);

    let cleaned = fs::read_to_string(test_dir.join("output").join("usage-clean.csv"))
        .expect("failed to read cleaned file");
    let lines: Vec<_> = cleaned.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Datetime,kwh",
            "06-01-2020 10:00,0.5",
            "06-01-2020 10:10,0.3",
            "11-01-2020 10:00,0.5",
        ]
    );

    let args = ["--project-dir", test_dir_str, "analyze"];
    assert_success(&run_bin(&args), &args);

    let figure_dir = test_dir.join("figures");
    for name in ["series", "daily", "daytime", "daywise", "composition"] {
        assert!(figure_dir.join(format!("usage-{name}.json")).is_file());
    }
    assert!(!figure_dir.join("usage-trend.json").exists());

    let daytype = read_json(&figure_dir.join("usage-daytype.json"));
    assert_eq!(daytype["series"][0]["name"], "Weekday");
    assert_eq!(daytype["series"][0]["points"][0]["x"], "10:00");
    assert_eq!(daytype["series"][0]["points"][0]["y"], 0.5);
    assert_eq!(daytype["series"][0]["points"][1]["y"], 0.3);
    assert_eq!(daytype["series"][1]["name"], "Weekend");
    assert_eq!(daytype["series"][1]["points"][0]["y"], 0.5);
    assert!(daytype["series"][1]["points"][1]["y"].is_null());

    let args = ["--project-dir", test_dir_str, "reset"];
    assert_success(&run_bin(&args), &args);
    assert!(!test_dir.join("output").exists());
    assert!(!figure_dir.exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn malformed_timestamp_fails() {
    let test_dir = create_project(
        "malformed_timestamp",
        "Datetime,kwh\n06-01-2020 10:00,0.2\n2020/01/06 10:10,0.3\n",
    );
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    let output = run_bin(&["--project-dir", test_dir_str, "clean"]);

    assert!(!output.status.success());
    let stderr_str = String::from_utf8_lossy(&output.stderr);
    assert!(stderr_str.contains("2020/01/06 10:10"), "stderr:\n{stderr_str}");
    assert!(!test_dir.join("output").join("usage-clean.csv").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn missing_config_fails() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("missing_config");
    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir_all(&test_dir).expect("failed to create test directory");
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    let output = run_bin(&["--project-dir", test_dir_str, "analyze"]);

    assert!(!output.status.success());
    let stderr_str = String::from_utf8_lossy(&output.stderr);
    assert!(stderr_str.contains("config.toml"), "stderr:\n{stderr_str}");

    fs::remove_dir_all(&test_dir).ok();
}
