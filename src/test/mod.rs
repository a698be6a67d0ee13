mod framing;
mod source;
