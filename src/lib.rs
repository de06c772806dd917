//! aro-bootstrap - prepare an Azure subscription for Azure Red Hat OpenShift.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── run           # Run every bootstrap step
//! │   ├── validate      # Offline configuration check
//! │   ├── status        # Show checkpoint progress
//! │   ├── reset         # Drop the checkpoint
//! │   ├── completions   # Shell completions
//! │   └── output        # Coloured status lines
//! └── core/             # Core library components
//!     ├── config        # RunConfig, defaults, network checks
//!     ├── validation    # Name and region rules
//!     ├── azure/        # Cloud trait and az CLI backend
//!     ├── bootstrap     # Step orchestration and RunContext
//!     ├── checkpoint    # Resumable run state
//!     ├── retry         # Backoff for eventually consistent lookups
//!     ├── variables     # Generated variables file
//!     └── fs            # Private file writes, .gitignore upkeep
//! ```
//!
//! # Steps
//!
//! 1. Validate configuration
//! 2. Read the account context (`az account show`)
//! 3. Register resource providers
//! 4. Ensure the resource group
//! 5. Create the service principal
//! 6. Assign roles on the resource group
//! 7. Resolve the ARO resource provider identity
//! 8. Load the pull secret
//! 9. Write the variables file

pub mod cli;
pub mod core;
pub mod error;
