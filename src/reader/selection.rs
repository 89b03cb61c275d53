// Selection
//------------------------------------------------------------------------------

/// Checked flags over the rendered message list. Indices are dense from 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    checked: Vec<bool>,
    multi: bool,
}

impl Selection {
    pub fn new(multi: bool) -> Self {
        Self { checked: Vec::new(), multi }
    }

    /// Resizes to `len` rendered entries with only `auto` checked.
    pub fn reset(&mut self, len: usize, auto: Option<usize>) {
        self.checked = vec![false; len];
        if let Some(c) = auto.and_then(|i| self.checked.get_mut(i)) {
            *c = true;
        }
    }

    pub fn len(&self) -> usize {
        self.checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    pub fn is_multi(&self) -> bool {
        self.multi
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.get(index).copied().unwrap_or(false)
    }

    /// Flips `index`. Returns false when no entry is rendered at `index`.
    pub fn toggle(&mut self, index: usize) -> bool {
        let Some(c) = self.checked.get_mut(index) else {
            return false;
        };
        *c = !*c;
        self.enforce_single(Some(index));
        true
    }

    /// In single-select mode, clears every index except `keep`.
    pub fn enforce_single(&mut self, keep: Option<usize>) {
        if self.multi {
            return;
        }
        self.checked.iter_mut().enumerate().filter(|(i, _)| Some(*i) != keep).for_each(|(_, c)| {
            *c = false;
        });
    }

    /// Leaving multi-select clears every checked entry; none is exempt.
    pub fn set_multi_select(&mut self, enabled: bool) {
        if self.multi == enabled {
            return;
        }
        self.multi = enabled;
        if !enabled {
            self.enforce_single(None);
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.checked.iter().enumerate().filter(|(_, c)| **c).map(|(i, _)| i)
    }
}
