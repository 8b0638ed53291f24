pub mod error;
pub mod formats;
pub mod fs;

pub use error::{ConvertError, ConvertResult};
pub use formats::{EncoderKind, PreprocessorKind, ENCODERS, PREPROCESSORS};
pub use fs::{
    create_output_dir,
    expand_inputs,
    extract_filename,
    output_path,
};
