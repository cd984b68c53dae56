/// Minimal search interface — provides neighbor enumeration.
pub trait Pather<N> {
    /// Append neighbors of `node` into `buf`. The search clears `buf` before calling.
    fn neighbors(&self, node: N, buf: &mut Vec<N>);
}

impl<N, F> Pather<N> for F
where
    F: Fn(N, &mut Vec<N>),
{
    fn neighbors(&self, node: N, buf: &mut Vec<N>) {
        self(node, buf)
    }
}
