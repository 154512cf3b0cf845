pub use clap::Parser;

use url::Url;

#[derive(Parser, Debug)]
#[command(name = "trove")]
#[command(about = "Multi-tenant collection sharing with bearer auth and rate-limited share links")]
pub struct Args {
    /// Base URL of a running service
    #[arg(long, global = true, default_value = "http://localhost:3000")]
    pub remote: Url,

    /// Bearer token for authenticated calls (see `trove login`)
    #[arg(long, global = true, env = "TROVE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Command;

    #[test]
    fn test_remote_defaults_to_local_service() {
        let args = Args::try_parse_from(["trove", "version"]).unwrap();
        assert_eq!(args.remote.as_str(), "http://localhost:3000/");
        assert!(matches!(args.command, Command::Version(_)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "trove",
            "shared",
            "abc123",
            "--remote",
            "http://example.com:9000",
            "--token",
            "t0k3n",
        ])
        .unwrap();
        assert_eq!(args.remote.port(), Some(9000));
        assert_eq!(args.token.as_deref(), Some("t0k3n"));
        match args.command {
            Command::Shared(req) => assert_eq!(req.token, "abc123"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_collection_create_parses_data() {
        let args = Args::try_parse_from([
            "trove",
            "collection",
            "create",
            "--name",
            "notes",
            "--data",
            r#"{"k": 1}"#,
            "--access-level",
            "SHARED",
        ])
        .unwrap();
        let Command::Collection(collection) = args.command else {
            panic!("expected collection command");
        };
        let crate::cli::ops::collection::CollectionCommand::Create(req) = collection.command
        else {
            panic!("expected create");
        };
        assert_eq!(req.name, "notes");
        assert_eq!(req.data.unwrap()["k"], 1);
        assert_eq!(req.access_level, common::prelude::AccessLevel::Shared);
    }

    #[test]
    fn test_collection_create_rejects_non_object_data() {
        let result = Args::try_parse_from([
            "trove",
            "collection",
            "create",
            "--name",
            "notes",
            "--data",
            "[1, 2]",
        ]);
        assert!(result.is_err());
    }
}
