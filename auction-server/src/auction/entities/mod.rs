mod bid;
mod package;
mod result;

pub use {
    bid::*,
    package::*,
    result::*,
};
