/// A destination for a run of output bytes.
///
/// This is the one capability shared by every component that produces
/// terminal output: the differential renderer writing to the outer fd,
/// a PTY reader fanning child output out to several consumers, a session
/// recorder. None of them need to know what's on the other end, so they
/// take `&mut dyn ByteSink` rather than a concrete `Write` type.
pub trait ByteSink {
    fn write(&mut self, bytes: &[u8]);
}

impl ByteSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}
