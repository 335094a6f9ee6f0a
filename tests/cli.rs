#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sobreaviso-cli").unwrap();
    cmd.arg("--config")
        .arg(dir.join("missing.json"))
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

fn add_call_out(dir: &Path) -> String {
    let out = cli(dir)
        .args([
            "add",
            "--date",
            "2025-03-02",
            "--start",
            "22:00",
            "--end",
            "01:00",
            "--technician",
            "Rafael",
            "--os",
            "250007",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());
    String::from_utf8(out.stdout).unwrap().trim().to_string()
}

#[test]
fn os_mask() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .args(["os-mask", "--input", "25a00071"])
        .assert()
        .success()
        .stdout("25.0007\n");
}

#[test]
fn holidays_for_month_without_holidays() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .args(["holidays", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nenhum feriado em Março de 2025"));
}

#[test]
fn add_then_list() {
    let dir = tempdir().unwrap();
    let id = add_call_out(dir.path());
    cli(dir.path())
        .args(["list", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()))
        .stdout(predicate::str::contains("25.0007"))
        .stdout(predicate::str::contains("3,00 h"));
}

#[test]
fn declined_delete_keeps_record() {
    let dir = tempdir().unwrap();
    let id = add_call_out(dir.path());
    cli(dir.path())
        .args(["delete", "--month", "2025-03", "--id", id.as_str()])
        .write_stdin("n\n")
        .assert()
        .code(2);
    cli(dir.path())
        .args(["list", "--month", "2025-03"])
        .assert()
        .stdout(predicate::str::contains(id.as_str()));

    cli(dir.path())
        .args(["delete", "--month", "2025-03", "--id", id.as_str(), "--yes"])
        .assert()
        .success();
    cli(dir.path())
        .args(["list", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()).not());
}

#[test]
fn failed_import_writes_nothing() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("in.csv");
    std::fs::write(
        &csv,
        "date,start,end,technician,os_numero\n\
         2025-03-02,22:00,01:00,Rafael,250001\n\
         2025-04-03,22:00,01:00,Rafael,250002\n",
    )
    .unwrap();

    cli(dir.path())
        .args(["import-csv", "--month", "2025-03", "--csv"])
        .arg(&csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("entry 2"));
    cli(dir.path())
        .args(["list", "--month", "2025-03"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn import_applies_os_mask() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("in.csv");
    std::fs::write(
        &csv,
        "date,start,end,technician,os_numero\n2025-03-02,22:00,01:00,Rafael,250001\n",
    )
    .unwrap();

    cli(dir.path())
        .args(["import-csv", "--month", "2025-03", "--csv"])
        .arg(&csv)
        .assert()
        .success()
        .stdout("1 atendimento(s) importado(s)\n");
    cli(dir.path())
        .args(["list", "--month", "2025-03"])
        .assert()
        .stdout(predicate::str::contains("25.0001"));
}

#[test]
fn invalid_month_is_rejected() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .args(["schedule", "--month", "2025-13"])
        .assert()
        .failure();
}

#[test]
fn report_written_to_output_dir() {
    let dir = tempdir().unwrap();
    add_call_out(dir.path());
    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();
    cli(dir.path())
        .args(["report", "--month", "2025-03", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Relatorio_Sobreaviso_2025-03.txt"));
    assert!(out.join("Relatorio_Sobreaviso_2025-03.txt").exists());
}
