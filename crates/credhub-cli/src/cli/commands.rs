use clap::{ArgGroup, Subcommand};

/// Main CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Get or set the CredHub API target
    Api {
        /// URL of the CredHub API, prints the current target when omitted
        server: Option<String>,

        /// Disable TLS certificate verification
        #[arg(long)]
        skip_tls_validation: bool,
    },

    /// Authenticate against the targeted server
    Login {
        /// Username, prompted for when missing
        #[arg(short, long)]
        username: Option<String>,

        /// Password, prompted for when missing
        #[arg(short, long)]
        password: Option<String>,

        /// Client name for client credentials authentication
        #[arg(long, env = "CREDHUB_CLIENT", hide_env_values = true)]
        client_name: Option<String>,

        /// Client secret for client credentials authentication
        #[arg(long, env = "CREDHUB_SECRET", hide_env_values = true)]
        client_secret: Option<String>,
    },

    /// Discard the stored session
    Logout,

    /// Get a credential value
    #[command(group(ArgGroup::new("selector").args(["name", "id"]).required(true)))]
    Get {
        /// Name of the credential
        #[arg(short, long)]
        name: Option<String>,

        /// Id of a specific credential version
        #[arg(long)]
        id: Option<String>,
    },

    /// Find credentials by path or partial name
    #[command(group(ArgGroup::new("query").args(["path", "name_like"])))]
    Find {
        /// Path to list credentials under
        #[arg(short, long)]
        path: Option<String>,

        /// Fragment of the credential name
        #[arg(short = 'n', long)]
        name_like: Option<String>,
    },

    /// Set a credential value
    Set {
        /// Name of the credential
        #[arg(short, long)]
        name: String,

        /// Credential type (value, password, json, user, certificate, ssh, rsa)
        #[arg(short = 't', long = "type")]
        credential_type: String,

        /// Credential value, JSON for structured types
        #[arg(short = 'w', long)]
        value: String,

        /// Keep the existing value if the credential exists
        #[arg(long)]
        no_overwrite: bool,
    },

    /// Generate a new value for an existing credential
    Regenerate {
        /// Name of the credential
        #[arg(short, long)]
        name: String,
    },

    /// Delete a credential, or every credential under a path
    #[command(group(ArgGroup::new("target").args(["name", "path"]).required(true)))]
    Delete {
        /// Name of the credential
        #[arg(short, long)]
        name: Option<String>,

        /// Path of the credentials
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Show a permission
    #[command(group(ArgGroup::new("permission").args(["uuid", "name"]).required(true)))]
    GetPermission {
        /// Permission uuid (servers from 2.0)
        #[arg(short, long)]
        uuid: Option<String>,

        /// Credential name (servers before 2.0)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Grant an actor operations on a path
    SetPermission {
        /// Credential path
        #[arg(short, long)]
        path: String,

        /// Actor receiving the permission
        #[arg(short, long)]
        actor: String,

        /// Comma separated operations, e.g. read,write
        #[arg(short, long, value_delimiter = ',', required = true)]
        operations: Vec<String>,
    },

    /// Show CLI and server versions
    Version,

    /// Print a fresh bearer token
    Token,
}
