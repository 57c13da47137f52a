/// A set of event registrations removed together on drop
pub struct Listeners<L> {
    listeners: Vec<L>,
}

impl<L> Default for Listeners<L> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<L> Listeners<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep a registration alive for as long as the set
    pub fn push(&mut self, listener: L) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
