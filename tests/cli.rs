use assert_cmd::Command;
use predicates::str::contains;
use std::path::Path;
use tempfile::TempDir;

const MASTER: &str = "correct horse battery staple";

fn cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gensecret").unwrap();
    cmd.env("HOME", home)
        .env("GENSECRET_MASTER_PASSWORD", MASTER)
        .env("GENSECRET_CONFIG", home.join("config.toml"))
        .env_remove("GENSECRET_PW_DEFAULT_LENGTH")
        .env_remove("GENSECRET_VAULT")
        .env_remove("RUST_LOG")
        .arg("--vault")
        .arg(home.join("vault"))
        .arg("--no-interactive");
    cmd
}

fn init(home: &Path) {
    cmd(home)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Vault initialized successfully!"));
}

#[test]
fn init_twice_fails() {
    let home = TempDir::new().unwrap();
    init(home.path());

    cmd(home.path()).arg("init").assert().failure().code(5);
}

#[test]
fn generate_show_and_complete() {
    let home = TempDir::new().unwrap();
    init(home.path());

    cmd(home.path())
        .args(["generate", "--force", "--print", "web/a.example.com", "16"])
        .assert()
        .success()
        .stdout(contains("Password for entry \"web/a.example.com\" generated"))
        .stdout(contains("The generated password is:"));

    let output = cmd(home.path())
        .args(["show", "web/a.example.com"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.lines().next().unwrap().len(), 16);

    cmd(home.path())
        .args(["complete-generate", "exam"])
        .assert()
        .success()
        .stdout("example.com\n");

    cmd(home.path())
        .args(["list"])
        .assert()
        .success()
        .stdout("web/a.example.com\n");
}

#[test]
fn generate_does_not_print_by_default() {
    let home = TempDir::new().unwrap();
    init(home.path());

    cmd(home.path())
        .args(["generate", "mail/bob", "20", "user=bob"])
        .assert()
        .success()
        .stdout(contains(
            "Not printing secrets by default. Use 'gensecret show mail/bob' to display the password.",
        ));

    cmd(home.path())
        .args(["show", "mail/bob", "user"])
        .assert()
        .success()
        .stdout("bob\n");
}

#[test]
fn zero_length_is_usage_error() {
    let home = TempDir::new().unwrap();
    init(home.path());

    cmd(home.path())
        .args(["generate", "mail/bob", "0"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("password length must not be zero"));
}

#[test]
fn existing_entry_is_not_overwritten_without_confirmation() {
    let home = TempDir::new().unwrap();
    init(home.path());

    cmd(home.path())
        .args(["generate", "mail/bob", "12"])
        .assert()
        .success();

    cmd(home.path())
        .args(["generate", "mail/bob", "12"])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("user aborted. not overwriting your current password"));
}

#[test]
fn wrong_master_password() {
    let home = TempDir::new().unwrap();
    init(home.path());

    cmd(home.path())
        .env("GENSECRET_MASTER_PASSWORD", "wrong")
        .args(["generate", "mail/bob", "12"])
        .assert()
        .failure()
        .code(11);
}
