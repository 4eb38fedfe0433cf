use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn habitviz_help_works() {
    Command::cargo_bin("habitviz")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("heat-map"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = ["show", "grid", "days", "week", "init"];

    for cmd in subcommands {
        Command::cargo_bin("habitviz")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn unknown_subcommand_fails() {
    Command::cargo_bin("habitviz")
        .expect("binary")
        .arg("bogus")
        .assert()
        .failure();
}
