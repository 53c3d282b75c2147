use glib;
use gtk::glib::subclass::prelude::*;
use gtk::{prelude::*, Button}; // Assuming it might be a button or extend it

mod imp;

glib::wrapper! {
    pub struct NetworkManagementWidget(ObjectSubclass<imp::NetworkManagementWidget>)
        @extends gtk::Widget, gtk::Button, @implements gtk::Accessible, gtk::Actionable, gtk::Buildable, gtk::ConstraintTarget;
}

impl NetworkManagementWidget {
    pub fn new() -> Self {
        glib::Object::new(&[])
    }

    // Placeholder for any future public methods
}
