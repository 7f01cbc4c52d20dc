use std::io::Write;

use tempfile::NamedTempFile;

pub fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

pub fn exchange_toml(kind: &str) -> String {
    format!(
        concat!(
            "[exchange]\n",
            "kind = \"{}\"\n",
            "access_key = \"access\"\n",
            "secret_key = \"secret\"\n",
            "account_id = \"100009\"\n",
            "\n",
            "[logging]\n",
            "level = \"warn\"\n",
            "format = \"json\"\n",
        ),
        kind
    )
}
