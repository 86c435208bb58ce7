//! Protocol activation parameters.
//!
//! Heights at which protocol versions switch on, per network. Built once
//! during bootstrap (optionally forced to trivial values for testing) and
//! handed to the node by value.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Height at which pegnetd starts applying transactions and conversions.
pub const PEGNET_ACTIVATION: u32 = 206_421;

/// Height at which the second grading algorithm takes effect.
pub const GRADING_V2_ACTIVATION: u32 = 210_330;

/// Grading version forced in testing mode.
pub const TESTING_GRADING_VERSION: u8 = 2;

/// Factom network the node follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    MainNet,
    TestNet,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Network::MainNet => "MainNet",
            Network::TestNet => "TestNet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown network {0:?} (expected MainNet or TestNet)")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "main-net" | "main" => Ok(Network::MainNet),
            "testnet" | "test-net" | "test" => Ok(Network::TestNet),
            _ => Err(UnknownNetwork(s.to_string())),
        }
    }
}

/// Which grading algorithm applies at a given height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingSchedule {
    /// Version 1 below `v2_height`, version 2 from it onwards.
    Stepped { v2_height: u32 },
    /// The same version at every height.
    Fixed(u8),
}

impl GradingSchedule {
    pub fn version_at(self, height: u32) -> u8 {
        match self {
            GradingSchedule::Stepped { v2_height } if height < v2_height => 1,
            GradingSchedule::Stepped { .. } => 2,
            GradingSchedule::Fixed(version) => version,
        }
    }
}

/// Activation settings for one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkActivation {
    /// First block the node synchronizes.
    pub activation_height: u32,
    pub grading: GradingSchedule,
}

/// Protocol switches consumed by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationParameters {
    pub pegnet_activation: u32,
    pub grading_v2_activation: u32,
    pub mainnet: NetworkActivation,
    pub testnet: NetworkActivation,
}

impl Default for ActivationParameters {
    fn default() -> Self {
        Self {
            pegnet_activation: PEGNET_ACTIVATION,
            grading_v2_activation: GRADING_V2_ACTIVATION,
            mainnet: NetworkActivation {
                activation_height: PEGNET_ACTIVATION,
                grading: GradingSchedule::Stepped {
                    v2_height: GRADING_V2_ACTIVATION,
                },
            },
            testnet: NetworkActivation {
                activation_height: 0,
                grading: GradingSchedule::Stepped { v2_height: 0 },
            },
        }
    }
}

impl ActivationParameters {
    /// Force every activation to height 0 and grading to version 2.
    pub fn apply_testing_overrides(&mut self) {
        self.pegnet_activation = 0;
        self.grading_v2_activation = 0;
        for network in [&mut self.mainnet, &mut self.testnet] {
            network.activation_height = 0;
            network.grading = GradingSchedule::Fixed(TESTING_GRADING_VERSION);
        }
    }

    pub fn network(&self, network: Network) -> &NetworkActivation {
        match network {
            Network::MainNet => &self.mainnet,
            Network::TestNet => &self.testnet,
        }
    }

    pub fn activation_height(&self, network: Network) -> u32 {
        self.network(network).activation_height
    }

    pub fn grading_version(&self, network: Network, height: u32) -> u8 {
        self.network(network).grading.version_at(height)
    }

    /// Whether transactions are processed at `height`.
    pub fn pegnet_active(&self, height: u32) -> bool {
        height >= self.pegnet_activation
    }
}
