// Module audio - Sample/beat time conversions

pub mod timing;
