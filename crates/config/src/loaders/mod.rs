//! Environment access and section loaders

mod dotenv;
mod env;
pub mod section;

pub use dotenv::{DotenvHook, DotenvLoader, Environment, load_with_dotenvy, skip_dotenv};
pub use env::{EnvReader, EnvSource, MapEnv, ProcessEnv};
pub use section::{Loader, LoaderContext, SectionData, loader};
