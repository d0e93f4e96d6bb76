pub mod logger;

pub struct Event<T> {
    listeners: Vec<Box<dyn FnMut(&T)>>,
}

impl<T> Event<T> {
    pub fn new() -> Self {
        Event {
            listeners: Vec::new(),
        }
    }
    pub fn add_listener<F>(&mut self, f: F)
    where
        F: FnMut(&T) + 'static,
    {
        self.listeners.push(Box::new(f));
    }
    pub fn emit(&mut self, param: &T) {
        for listener in self.listeners.iter_mut() {
            listener(param);
        }
    }
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<T> Default for Event<T> {
    fn default() -> Self {
        Event::new()
    }
}

#[macro_export]
macro_rules! impl_add_event_listener {
    ($type:ty, $member:ident, $param:ty, $fn_name:ident) => {
        impl $type {
            pub fn $fn_name<F>(&mut self, f: F)
            where
                F: FnMut(&$param) + 'static,
            {
                self.$member.add_listener(f);
            }
        }
    };
}
