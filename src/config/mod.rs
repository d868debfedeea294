//! Validated generator configuration: the feature toggles a script is built from.
//!
//! A [`RawConfig`] is what arrives from JSON or from the question flow; every
//! field has a batch-mode default and enumerated fields are plain integers.
//! [`ScriptConfig::validate`] checks value domains and fragment rules and is
//! the only way to obtain a [`ScriptConfig`], which is immutable afterwards.
pub mod loader;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Every configuration field name, in declaration order.
pub const FIELD_NAMES: [&str; 13] = [
    "use_env",
    "greadlink",
    "logging_utils",
    "set_e",
    "set_x",
    "err_trap",
    "exit_trap",
    "main",
    "options",
    "positionals",
    "usage",
    "dry",
    "utils",
];

/// Define a closed, integer-coded choice with its field name and domain.
macro_rules! choice {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal, allowed = $allowed:literal {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Configuration field this choice is stored in.
            pub const FIELD: &'static str = $field;
            /// Every variant, in code order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Integer code used in JSON and in the question flow.
            #[must_use]
            pub const fn code(self) -> i64 {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            /// Decode an integer, rejecting values outside the domain.
            ///
            /// # Errors
            ///
            /// Returns [`ConfigError::OutOfDomain`] naming the field.
            pub const fn from_code(value: i64) -> Result<Self, ConfigError> {
                match value {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(ConfigError::OutOfDomain {
                        field: $field,
                        value,
                        allowed: $allowed,
                    }),
                }
            }
        }
    };
}

choice! {
    /// Whether and where an `ERR` trap is installed.
    ErrTrap, field = "err_trap", allowed = "0, 1, 2" {
        /// No error trap.
        None = 0,
        /// Trap installed for the top-level shell only.
        TopLevel = 1,
        /// Trap inherited by functions and subshells (`set -E`).
        Inherited = 2,
    }
}

choice! {
    /// What the `EXIT` trap cleans up.
    ExitTrap, field = "exit_trap", allowed = "0, 1, 2, 3" {
        /// No exit trap.
        None = 0,
        /// Only log that the script exits.
        Message = 1,
        /// Remove one temporary directory.
        TempDir = 2,
        /// Remove every path accumulated in a list.
        CleanupList = 3,
    }
}

choice! {
    /// How the `print_help` function gets called.
    Usage, field = "usage", allowed = "1, 2, 3" {
        /// Tied to `-h` and `--help`.
        HelpOption = 1,
        /// Also printed when no argument is given.
        NoArguments = 2,
        /// Defined, but left for the script author to call.
        Manual = 3,
    }
}

choice! {
    /// Where shared helper functions are stored.
    UtilsMode, field = "utils", allowed = "0, 1, 2" {
        /// Inside the script itself.
        Inline = 0,
        /// In `common.sh` next to the script, overwriting it.
        Overwrite = 1,
        /// In `common.sh`, or the first free `common-N.sh`.
        Suffix = 2,
    }
}

/// Unvalidated configuration, as read from JSON or built by the question flow.
///
/// Missing fields take the batch-mode defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)] // mirrors the flat JSON record
pub struct RawConfig {
    /// Shebang through `env` instead of a fixed interpreter path.
    pub use_env: bool,
    /// Try `greadlink` before `readlink` when resolving `BASEDIR`.
    pub greadlink: bool,
    /// Include the leveled logging helpers.
    pub logging_utils: bool,
    /// Emit `set -e`.
    pub set_e: bool,
    /// Emit `set -x`.
    pub set_x: bool,
    /// Error trap code, see [`ErrTrap`].
    pub err_trap: i64,
    /// Exit trap code, see [`ExitTrap`].
    pub exit_trap: i64,
    /// Wrap the body in a `main` function.
    pub main: bool,
    /// Accept flag-style options.
    pub options: bool,
    /// Accept positional arguments.
    pub positionals: bool,
    /// Help layout code, see [`Usage`].
    pub usage: i64,
    /// Include the dry-run gate.
    pub dry: bool,
    /// Helper storage code, see [`UtilsMode`].
    pub utils: i64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            use_env: true,
            greadlink: false,
            logging_utils: true,
            set_e: false,
            set_x: false,
            err_trap: ErrTrap::None.code(),
            exit_trap: ExitTrap::None.code(),
            main: false,
            options: true,
            positionals: true,
            usage: Usage::HelpOption.code(),
            dry: false,
            utils: UtilsMode::Inline.code(),
        }
    }
}

impl RawConfig {
    /// Validate into an immutable [`ScriptConfig`].
    ///
    /// # Errors
    ///
    /// See [`ScriptConfig::validate`].
    pub fn validate(&self) -> Result<ScriptConfig, ConfigError> {
        ScriptConfig::validate(self)
    }
}

/// A validated, immutable script configuration.
///
/// Byte-identical configurations always generate byte-identical scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::struct_excessive_bools)]
pub struct ScriptConfig {
    pub(crate) use_env: bool,
    pub(crate) greadlink: bool,
    pub(crate) logging_utils: bool,
    pub(crate) set_e: bool,
    pub(crate) set_x: bool,
    pub(crate) err_trap: ErrTrap,
    pub(crate) exit_trap: ExitTrap,
    pub(crate) main: bool,
    pub(crate) options: bool,
    pub(crate) positionals: bool,
    pub(crate) usage: Usage,
    pub(crate) dry: bool,
    pub(crate) utils: UtilsMode,
}

impl ScriptConfig {
    /// Check value domains and fragment rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfDomain`] for an illegal enumerated value
    /// and [`ConfigError::Dependency`] when the toggles select fragments that
    /// cannot be combined (for example `exit_trap = 3` without `main`).
    pub fn validate(raw: &RawConfig) -> Result<Self, ConfigError> {
        let config = Self::decode(raw)?;
        crate::resolver::resolve(&config)?;
        Ok(config)
    }

    /// Decode enumerated fields without checking fragment rules.
    pub(crate) fn decode(raw: &RawConfig) -> Result<Self, ConfigError> {
        let err_trap = ErrTrap::from_code(raw.err_trap)?;
        let exit_trap = ExitTrap::from_code(raw.exit_trap)?;
        let usage = Usage::from_code(raw.usage)?;
        let utils = UtilsMode::from_code(raw.utils)?;
        Ok(Self {
            use_env: raw.use_env,
            greadlink: raw.greadlink,
            logging_utils: raw.logging_utils,
            set_e: raw.set_e,
            set_x: raw.set_x,
            err_trap,
            exit_trap,
            main: raw.main,
            options: raw.options,
            positionals: raw.positionals,
            usage,
            dry: raw.dry,
            utils,
        })
    }

    /// The raw form of this configuration, e.g. for dumping as JSON.
    #[must_use]
    pub const fn to_raw(&self) -> RawConfig {
        RawConfig {
            use_env: self.use_env,
            greadlink: self.greadlink,
            logging_utils: self.logging_utils,
            set_e: self.set_e,
            set_x: self.set_x,
            err_trap: self.err_trap.code(),
            exit_trap: self.exit_trap.code(),
            main: self.main,
            options: self.options,
            positionals: self.positionals,
            usage: self.usage.code(),
            dry: self.dry,
            utils: self.utils.code(),
        }
    }

    /// Shebang through `env`.
    #[must_use]
    pub const fn use_env(&self) -> bool {
        self.use_env
    }

    /// `greadlink` support for `BASEDIR`.
    #[must_use]
    pub const fn greadlink(&self) -> bool {
        self.greadlink
    }

    /// Logging helpers included.
    #[must_use]
    pub const fn logging_utils(&self) -> bool {
        self.logging_utils
    }

    /// `set -e` emitted.
    #[must_use]
    pub const fn set_e(&self) -> bool {
        self.set_e
    }

    /// `set -x` emitted.
    #[must_use]
    pub const fn set_x(&self) -> bool {
        self.set_x
    }

    /// Error trap mode.
    #[must_use]
    pub const fn err_trap(&self) -> ErrTrap {
        self.err_trap
    }

    /// Exit trap mode.
    #[must_use]
    pub const fn exit_trap(&self) -> ExitTrap {
        self.exit_trap
    }

    /// Body wrapped in `main`.
    #[must_use]
    pub const fn main(&self) -> bool {
        self.main
    }

    /// Flag-style options accepted.
    #[must_use]
    pub const fn options(&self) -> bool {
        self.options
    }

    /// Positional arguments accepted.
    #[must_use]
    pub const fn positionals(&self) -> bool {
        self.positionals
    }

    /// Help layout.
    #[must_use]
    pub const fn usage(&self) -> Usage {
        self.usage
    }

    /// Dry-run gate included.
    #[must_use]
    pub const fn dry(&self) -> bool {
        self.dry
    }

    /// Helper storage mode.
    #[must_use]
    pub const fn utils(&self) -> UtilsMode {
        self.utils
    }

    /// Whether helpers go to a separate file.
    #[must_use]
    pub const fn is_split(&self) -> bool {
        !matches!(self.utils, UtilsMode::Inline)
    }

    /// Short, filesystem-safe name made of every field value.
    ///
    /// Distinct configurations always get distinct slugs.
    #[must_use]
    pub fn slug(&self) -> String {
        let flag = |b: bool| u8::from(b);
        format!(
            "env{}-grl{}-log{}-e{}-x{}-err{}-exit{}-main{}-opt{}-pos{}-use{}-dry{}-utl{}",
            flag(self.use_env),
            flag(self.greadlink),
            flag(self.logging_utils),
            flag(self.set_e),
            flag(self.set_x),
            self.err_trap.code(),
            self.exit_trap.code(),
            flag(self.main),
            flag(self.options),
            flag(self.positionals),
            self.usage.code(),
            flag(self.dry),
            self.utils.code(),
        )
    }
}

impl TryFrom<RawConfig> for ScriptConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        Self::validate(&raw)
    }
}

/// Validate raw input into a configuration.
///
/// # Errors
///
/// See [`ScriptConfig::validate`].
pub fn validate(raw: &RawConfig) -> Result<ScriptConfig, ConfigError> {
    ScriptConfig::validate(raw)
}

/// Every valid configuration, in a fixed order.
pub fn all_valid() -> impl Iterator<Item = ScriptConfig> {
    (0u32..1 << 9).flat_map(|bits| {
        let bit = move |n: u32| bits & (1 << n) != 0;
        ErrTrap::ALL.iter().flat_map(move |&err_trap| {
            ExitTrap::ALL.iter().flat_map(move |&exit_trap| {
                Usage::ALL.iter().flat_map(move |&usage| {
                    UtilsMode::ALL.iter().filter_map(move |&utils| {
                        let raw = RawConfig {
                            use_env: bit(0),
                            greadlink: bit(1),
                            logging_utils: bit(2),
                            set_e: bit(3),
                            set_x: bit(4),
                            err_trap: err_trap.code(),
                            exit_trap: exit_trap.code(),
                            main: bit(5),
                            options: bit(6),
                            positionals: bit(7),
                            usage: usage.code(),
                            dry: bit(8),
                            utils: utils.code(),
                        };
                        ScriptConfig::validate(&raw).ok()
                    })
                })
            })
        })
    })
}
