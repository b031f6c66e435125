//! Shell text sent to the instance.
//!
//! Every value interpolated into a remote command passes through [`quote`],
//! which produces a POSIX single-quoted word.

use std::borrow::Cow;

/// Remote file holding trusted keys, relative to the target user's home
const AUTHORIZED_KEYS: &str = "~/.ssh/authorized_keys";

/// Quote a value as one shell word. `'` becomes `'\''`.
pub fn quote(value: &str) -> String {
    shell_escape::unix::escape(Cow::Borrowed(value)).into_owned()
}

/// Append `public_key` as one line of the user's `authorized_keys`.
pub fn authorize_key_script(public_key: &str) -> String {
    format!(
        "mkdir -p ~/.ssh && printf '%s\\n' {key} >> {file} && chmod 600 {file} && chmod 700 ~/.ssh",
        key = quote(public_key),
        file = AUTHORIZED_KEYS,
    )
}

/// Delete the `authorized_keys` line whose comment is `key_identifier`.
///
/// The match is anchored to the end of the line after a space, so an
/// identifier that is a prefix of another one does not match it.
pub fn revoke_key_script(key_identifier: &str) -> String {
    let pattern = format!("/ {}$/d", escape_sed_pattern(key_identifier));
    format!("sed -i {} {}", quote(&pattern), AUTHORIZED_KEYS)
}

/// Run `script` in a login shell of `user`.
pub fn run_as_user(user: &str, script: &str) -> String {
    format!("sudo su - {} -c {}", quote(user), quote(script))
}

/// Escape basic-regex metacharacters and the `/` delimiter.
fn escape_sed_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '/' | '.' | '*' | '[' | ']' | '^' | '$') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "ecdsa-sha2-nistp256 AAAAE2VjZHNhLXNoYTItbmlzdHAyNTYAAAAIbmlzdHAyNTYAAABBBF0= gh-actions-ssm-host-abc-42";

    /// What `sh` makes of `word`
    #[cfg(unix)]
    fn sh_eval(word: &str) -> String {
        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("printf '%s' {}", word))
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap()
    }

    #[test]
    fn test_quote_plain_and_special() {
        assert_eq!(quote("fake-user"), "fake-user");
        assert_eq!(quote("a b"), "'a b'");
        assert_eq!(quote("it's"), "'it'\\''s'");
        assert_eq!(quote(""), "''");
    }

    #[cfg(unix)]
    #[test]
    fn test_quote_round_trips_through_sh() {
        let samples = [
            "plain",
            "key with spaces",
            "o'brien's key",
            "$HOME `id` $(whoami)",
            "double \"quotes\" and \\backslash\\",
            "bang! ; rm -rf / && echo pwned",
            "''''",
        ];
        for sample in samples {
            assert_eq!(sh_eval(&quote(sample)), sample, "sample: {}", sample);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_nested_quoting_round_trips() {
        // the key is quoted inside the script, the script again for `su -c`
        let key = "ecdsa-sha2-nistp256 AAAA it's";
        let script = format!("printf '%s' {}", quote(key));
        let outer = format!("sh -c {}", quote(&script));

        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(&outer)
            .output()
            .unwrap();
        assert_eq!(String::from_utf8(output.stdout).unwrap(), key);
    }

    #[test]
    fn test_authorize_key_script() {
        assert_eq!(
            authorize_key_script(KEY),
            format!(
                "mkdir -p ~/.ssh && printf '%s\\n' '{}' >> ~/.ssh/authorized_keys && chmod 600 ~/.ssh/authorized_keys && chmod 700 ~/.ssh",
                KEY
            )
        );
    }

    #[test]
    fn test_run_as_user_keeps_key_verbatim() {
        let command = run_as_user("fake-user", &authorize_key_script(KEY));
        assert!(command.starts_with("sudo su - fake-user -c '"));
        assert!(command.contains(KEY));
    }

    #[test]
    fn test_run_as_user_quotes_user() {
        let command = run_as_user("bad user;id", "true");
        assert_eq!(command, "sudo su - 'bad user;id' -c true");
    }

    #[test]
    fn test_revoke_key_script() {
        assert_eq!(
            revoke_key_script("gh-actions-ssm-host-abc-42"),
            "sed -i '/ gh-actions-ssm-host-abc-42$/d' ~/.ssh/authorized_keys"
        );
    }

    #[test]
    fn test_escape_sed_pattern() {
        assert_eq!(escape_sed_pattern("a.b/c*[d]^$\\"), "a\\.b\\/c\\*\\[d\\]\\^\\$\\\\");
        assert_eq!(escape_sed_pattern("gh-actions-ssm-host-1-local"), "gh-actions-ssm-host-1-local");
    }

    /// Runs the generated scripts against a scratch HOME.
    #[cfg(target_os = "linux")]
    #[test]
    fn test_scripts_against_real_authorized_keys() {
        let home = tempfile::tempdir().unwrap();
        let run = |script: &str| {
            let status = std::process::Command::new("sh")
                .arg("-c")
                .arg(script)
                .env("HOME", home.path())
                .status()
                .unwrap();
            assert!(status.success(), "script failed: {}", script);
        };

        let other = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIE gh-actions-ssm-host-abc-421";
        let tricky = "ssh-ed25519 AAAA it's $HOME `x`";
        run(&authorize_key_script(other));
        run(&authorize_key_script(KEY));
        run(&authorize_key_script(tricky));

        let file = home.path().join(".ssh").join("authorized_keys");
        let content = std::fs::read_to_string(&file).unwrap();
        assert_eq!(content, format!("{}\n{}\n{}\n", other, KEY, tricky));

        run(&revoke_key_script("gh-actions-ssm-host-abc-42"));

        let content = std::fs::read_to_string(&file).unwrap();
        assert_eq!(content, format!("{}\n{}\n", other, tricky));
    }
}
