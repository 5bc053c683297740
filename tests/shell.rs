use std::{
    fs,
    io::Write,
    os::unix::fs::PermissionsExt,
    path::Path,
    process::{Command, Output, Stdio},
};

const PROMPT: &str = "sshell@ucd$ ";
const BYE: &str = "Bye...\n+ completed 'exit' [0]\n";

struct Session {
    stdout: String,
    stderr: String,
    output: Output,
}

fn run_in(dir: &Path, script: &str) -> Session {
    run_bytes_in(dir, script.as_bytes())
}

fn run_bytes_in(dir: &Path, script: &[u8]) -> Session {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sshell"))
        .current_dir(dir)
        .env_remove("SSHELL_CONFIG")
        .env_remove("SSHELL_LOG_DIR")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn sshell");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(script)
        .unwrap();

    let output = child.wait_with_output().unwrap();
    Session {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        output,
    }
}

fn run(script: &str) -> Session {
    let dir = tempfile::tempdir().unwrap();
    run_in(dir.path(), script)
}

fn completion_code(stderr: &str, line: &str) -> i32 {
    let prefix = format!("+ completed '{line}' [");
    let rest = stderr
        .lines()
        .find_map(|l| l.strip_prefix(prefix.as_str()))
        .unwrap_or_else(|| panic!("no completion for {line:?} in {stderr:?}"));
    rest.trim_end_matches(']').parse().unwrap()
}

#[test]
fn echo_hello() {
    let session = run("echo hello\n");

    assert!(session.output.status.success());
    assert_eq!(
        session.stdout,
        format!("{PROMPT}echo hello\nhello\n{PROMPT}exit\n")
    );
    assert_eq!(
        session.stderr,
        format!("+ completed 'echo hello' [0]\n{BYE}")
    );
}

#[test]
fn failing_program_reports_its_code() {
    let session = run("ls /nonexistent_dir_xyz\n");
    assert_ne!(completion_code(&session.stderr, "ls /nonexistent_dir_xyz"), 0);
}

#[test]
fn redirect_both_ways() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("infile"), "first\nsecond\n").unwrap();

    let session = run_in(dir.path(), "cat < infile > outfile\ncat>outfile2<infile\n");

    assert!(!session.stderr.contains("Error"), "{}", session.stderr);
    assert_eq!(completion_code(&session.stderr, "cat < infile > outfile"), 0);
    assert_eq!(completion_code(&session.stderr, "cat>outfile2<infile"), 0);
    for out in ["outfile", "outfile2"] {
        assert_eq!(
            fs::read_to_string(dir.path().join(out)).unwrap(),
            "first\nsecond\n"
        );
    }
}

#[test]
fn three_stage_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data"), "b\na\nb\nc\n").unwrap();

    let session = run_in(dir.path(), "sort < data | uniq -c | wc -l\n");

    assert!(session.stdout.lines().any(|l| l.trim() == "3"), "{}", session.stdout);
    assert!(session
        .stderr
        .starts_with("+ completed 'sort < data | uniq -c | wc -l' [0][0][0]\n"));
}

#[test]
fn mislocated_redirection_spawns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let session = run_in(dir.path(), "touch made | cat <\ntouch made | cat <\n");

    assert_eq!(
        session.stderr,
        format!("Error: mislocated input redirection\nError: mislocated input redirection\n{BYE}")
    );
    assert!(!dir.path().join("made").exists());
}

#[test]
fn exit_waits_for_background_job() {
    let session = run("sleep 0.5 &\nexit\nsleep 1\nexit\n");

    assert_eq!(
        session.stderr,
        format!(
            "Error: active job still running\n\
             + completed 'sleep 1' [0]\n\
             + completed 'sleep 0.5 &' [0]\n\
             {BYE}"
        )
    );
    assert!(session.output.status.success());
}

#[test]
fn end_of_input_drains_background_job() {
    let session = run("sleep 0.2 &\n");

    assert_eq!(
        session.stderr,
        format!("+ completed 'sleep 0.2 &' [0]\n{BYE}")
    );
    assert!(session.stdout.ends_with(&format!("{PROMPT}exit\n")));
}

#[test]
fn second_background_job_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let session = run_in(dir.path(), "sleep 0.3 &\ntouch made &\n");

    assert!(session
        .stderr
        .starts_with("Error: active job still running\n"));
    assert!(!dir.path().join("made").exists());
}

#[test]
fn background_misuse_is_rejected() {
    let session = run("echo a > out &\necho a | cat &\n");
    assert_eq!(
        session.stderr,
        format!("Error: mislocated background sign\nError: mislocated background sign\n{BYE}")
    );
}

#[test]
fn unknown_command_has_no_completion() {
    let session = run("nosuchcmd_xyz arg\n");
    assert_eq!(session.stderr, format!("Error: command not found\n{BYE}"));
}

#[test]
fn pipeline_reports_suppressed_stages() {
    let session = run("nosuchcmd_xyz | wc -l\n");
    assert_eq!(
        session.stderr,
        format!("Error: command not found\n+ completed 'nosuchcmd_xyz | wc -l' [255][0]\n{BYE}")
    );
}

#[test]
fn real_exit_255_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("exit255");
    fs::write(&script, "#!/bin/sh\nexit 255\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let session = run_in(dir.path(), "./exit255\n");
    assert_eq!(completion_code(&session.stderr, "./exit255"), 255);
}

#[test]
fn unreadable_input_file() {
    let session = run("cat < /nonexistent_file_xyz\n");
    assert!(session
        .stderr
        .starts_with("Error: cannot open input file\n"));
    assert_eq!(completion_code(&session.stderr, "cat < /nonexistent_file_xyz"), 2);
}

#[test]
fn missing_targets_and_commands() {
    let session = run("cat <\necho hi >\n> out\n");
    assert_eq!(
        session.stderr,
        format!(
            "Error: no input file\n\
             + completed 'cat <' [1]\n\
             Error: no output file\n\
             + completed 'echo hi >' [1]\n\
             Error: missing command\n\
             {BYE}"
        )
    );
}

#[test]
fn limits() {
    let args = vec!["echo"; 17].join(" ");
    let session = run(&format!("{args}\na | b | c | d | e\n"));
    assert_eq!(
        session.stderr,
        format!("Error: too many process arguments\nError: too many pipes (max 3)\n{BYE}")
    );
}

#[test]
fn invalid_utf8_line_does_not_stop_the_shell() {
    let dir = tempfile::tempdir().unwrap();
    let session = run_bytes_in(dir.path(), b"echo caf\xe9\necho after\n");

    assert!(session.output.status.success());
    assert!(session.stdout.contains("after\n"), "{}", session.stdout);
    assert_eq!(
        session.stderr,
        format!(
            "+ completed 'echo caf\u{fffd}' [0]\n\
             + completed 'echo after' [0]\n\
             {BYE}"
        )
    );
}

#[test]
fn cd_then_pwd() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().canonicalize().unwrap();
    let target = target.display();

    let session = run(&format!("cd {target}\npwd\ncd {target} {target}\ncd /nonexistent_dir_xyz\n"));

    assert!(session.stdout.contains(&format!("pwd\n{target}\n")));
    assert_eq!(
        session.stderr,
        format!(
            "+ completed 'cd {target}' [0]\n\
             Error: too many arguments\n\
             Error: cannot cd into directory\n\
             {BYE}"
        )
    );
}

#[test]
fn configured_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("sshell.toml");
    fs::write(&config, "prompt = \"> \"\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_sshell"))
        .current_dir(dir.path())
        .env("SSHELL_CONFIG", &config)
        .env_remove("SSHELL_LOG_DIR")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert_eq!(String::from_utf8_lossy(&output.stdout), "> exit\n");
}
